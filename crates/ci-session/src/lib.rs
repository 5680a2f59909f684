//! ci-session: read and write CodeIgniter/PyroCMS session cookies.
//!
//! This crate lets a program outside the legacy PHP framework decrypt,
//! inspect, modify and re-encrypt the session cookies that framework issues.
//!
//! # Overview
//!
//! A legacy session cookie is built in three layers:
//! - **Serialization**: the session map in PHP's `serialize()` text format
//! - **Encryption**: Rijndael with a 256-bit block in CBC mode, zero padding,
//!   a random 32-byte IV and a keyed additive "noise" mask
//! - **Transport**: standard base64
//!
//! # Quick Start
//!
//! ```rust
//! use ci_session::{Map, SessionCrypto, Value};
//!
//! let crypto = SessionCrypto::new("encryption key from config.php");
//!
//! let mut session = Map::new();
//! session.insert("session_id", "0123456789abcdef0123456789abcdef");
//! session.insert("last_activity", 1_500_000_000i64);
//! let value = Value::Map(session);
//!
//! let cookie = crypto.encrypt_cookie(&value).unwrap();
//! let decoded = crypto.decrypt_cookie(&cookie).unwrap();
//! assert_eq!(decoded, value);
//! assert_eq!(decoded.get("last_activity").and_then(Value::as_i64), Some(1_500_000_000));
//! ```
//!
//! # Modules
//!
//! - [`model`]: the [`Value`] tree and session rows
//! - [`codec`]: PHP `serialize()` encoding and decoding
//! - [`crypto`]: Rijndael, CBC, noise and the combined scheme
//! - [`cookie`]: base64 cookie text and session ids
//! - [`config`]: session options
//! - [`error`]: error types
//! - [`limits`]: decoder limits and scheme constants
//!
//! # Security
//!
//! The decoder is safe on untrusted input: nesting depth and preallocation
//! are bounded and malformed data is rejected with the byte position.
//!
//! The encryption scheme itself is weak and unauthenticated. It is kept
//! bit-compatible with the legacy framework, not hardened. A cookie decrypted
//! under the wrong key is detected only when its payload fails to decode.

pub mod codec;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod error;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{decode, encode};
pub use config::Config;
pub use cookie::{decrypt_cookie, encrypt_cookie, generate_session_id, is_bare_session_id};
pub use crypto::{SessionCrypto, apply_noise, decrypt, derive_key, encrypt, remove_noise};
pub use error::{CookieError, CryptoError, DecodeError};
pub use model::{Map, MemoryStore, SessionQuery, SessionRecord, SessionStore, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
