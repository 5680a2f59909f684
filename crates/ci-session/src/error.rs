//! Error types for session payload decoding, cookie encryption and decryption.

use thiserror::Error;

/// Renders a byte for error messages: printable ASCII as a character, anything else as hex.
fn show_byte(byte: &u8) -> String {
    if byte.is_ascii_graphic() || *byte == b' ' {
        format!("'{}'", *byte as char)
    } else {
        format!("0x{:02x}", byte)
    }
}

fn show_opt_byte(byte: &Option<u8>) -> String {
    match byte {
        Some(b) => show_byte(b),
        None => "end of input".to_string(),
    }
}

/// Error while decoding a PHP-serialized payload.
///
/// Every variant carries the byte offset into the input where the problem was
/// detected. Garbage input is an expected outcome (for example a cookie
/// decrypted with the wrong key), so none of these indicate a bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown token {} at position {position}", show_byte(.token))]
    UnknownToken { token: u8, position: usize },

    #[error("failed to parse integer at position {position}")]
    IntegerFormat { position: usize },

    #[error("failed to parse double at position {position}")]
    FloatFormat { position: usize },

    #[error("failed to parse boolean at position {position}")]
    BooleanFormat { position: usize },

    #[error("expected {} but got {} at position {position}", show_byte(.expected), show_opt_byte(.actual))]
    UnexpectedByte {
        expected: u8,
        actual: Option<u8>,
        position: usize,
    },

    #[error("unexpected end of input at position {position}")]
    UnexpectedEnd { position: usize },

    #[error("delimiter {} not found after position {position}", show_byte(.delimiter))]
    DelimiterNotFound { delimiter: u8, position: usize },

    #[error("array key must be an integer or string, found {} at position {position}", show_byte(.token))]
    InvalidKey { token: u8, position: usize },

    #[error("nesting depth exceeds maximum {max} at position {position}")]
    DepthExceeded { max: usize, position: usize },
}

impl DecodeError {
    /// Returns the byte offset at which decoding failed.
    pub fn position(&self) -> usize {
        match self {
            DecodeError::UnknownToken { position, .. }
            | DecodeError::IntegerFormat { position }
            | DecodeError::FloatFormat { position }
            | DecodeError::BooleanFormat { position }
            | DecodeError::UnexpectedByte { position, .. }
            | DecodeError::UnexpectedEnd { position }
            | DecodeError::DelimiterNotFound { position, .. }
            | DecodeError::InvalidKey { position, .. }
            | DecodeError::DepthExceeded { position, .. } => *position,
        }
    }
}

/// Error from the block cipher or the legacy cookie framing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid Rijndael key length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("invalid Rijndael block size: expected 16, 24 or 32 bytes, got {0}")]
    InvalidBlockSize(usize),

    #[error("encrypted payload is {len} bytes, shorter than the {iv_len}-byte IV")]
    TruncatedIv { len: usize, iv_len: usize },

    #[error("ciphertext length {len} is not a multiple of the {block_size}-byte block size")]
    InvalidCiphertextLength { len: usize, block_size: usize },

    #[error("random number generation failed: {0}")]
    Rng(String),
}

/// Error while reading a session cookie.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CookieError {
    #[error("cookie is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("cookie payload is not a valid serialized value: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_accessor() {
        let err = DecodeError::UnexpectedByte {
            expected: b';',
            actual: Some(b'x'),
            position: 7,
        };
        assert_eq!(err.position(), 7);
        assert_eq!(DecodeError::UnexpectedEnd { position: 3 }.position(), 3);
    }

    #[test]
    fn test_messages_render_bytes() {
        let err = DecodeError::UnknownToken { token: b'n', position: 1 };
        assert_eq!(err.to_string(), "unknown token 'n' at position 1");

        let err = DecodeError::UnexpectedByte {
            expected: b'}',
            actual: None,
            position: 9,
        };
        assert_eq!(err.to_string(), "expected '}' but got end of input at position 9");

        let err = DecodeError::UnknownToken { token: 0x00, position: 0 };
        assert_eq!(err.to_string(), "unknown token 0x00 at position 0");
    }
}
