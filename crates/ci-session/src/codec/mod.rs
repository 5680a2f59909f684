//! Text encoding/decoding for the PHP `serialize()` format.

pub mod primitives;
pub mod value;

pub use primitives::{Reader, Writer};
pub use value::{decode, decode_value, encode, encode_into};
