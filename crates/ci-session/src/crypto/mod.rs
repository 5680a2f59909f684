//! Legacy cookie cryptography.
//!
//! - [`rijndael`]: Rijndael for 16, 24 and 32-byte blocks behind [`BlockCipher`]
//! - [`cbc`]: CBC chaining with zero-byte padding
//! - [`noise`]: the keyed additive mask applied after encryption
//! - [`session`]: key derivation and the full encrypt/decrypt pipeline

pub mod cbc;
pub mod noise;
pub mod rijndael;
pub mod session;

pub use noise::Noise;
pub use rijndael::{BlockCipher, Rijndael};
pub use session::{
    DerivedKey, SessionCrypto, apply_noise, decrypt, derive_key, encrypt, remove_noise,
};
