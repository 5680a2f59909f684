//! Session cookies: serialized, encrypted, base64-encoded values.
//!
//! Cookie text is `base64(noise(iv || rijndael256_cbc(serialize(value))))`
//! using the standard alphabet with padding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::codec::{decode, encode};
use crate::crypto::SessionCrypto;
use crate::error::{CookieError, CryptoError};
use crate::limits::MAX_BARE_SESSION_ID_LEN;
use crate::model::{Map, Value};

/// Key in the cookie map that carries the session id.
pub const SESSION_ID_KEY: &str = "session_id";

impl SessionCrypto {
    /// Serializes, encrypts and base64-encodes `value`.
    pub fn encrypt_cookie(&self, value: &Value) -> Result<String, CryptoError> {
        let blob = self.encrypt(&encode(value))?;
        Ok(STANDARD.encode(blob))
    }

    /// Reverses [`Self::encrypt_cookie`].
    ///
    /// Empty text, and payloads that decode to nothing, give an empty map.
    /// A wrong key usually surfaces as [`CookieError::Decode`]; callers should
    /// treat every error as "no session".
    pub fn decrypt_cookie(&self, text: &str) -> Result<Value, CookieError> {
        if text.is_empty() {
            return Ok(Value::Map(Map::new()));
        }
        let blob = STANDARD.decode(text).inspect_err(|e| {
            tracing::debug!(error = %e, "session cookie is not valid base64");
        })?;
        let plaintext = self.decrypt(&blob).inspect_err(|e| {
            tracing::debug!(error = %e, "session cookie failed to decrypt");
        })?;
        match decode(&plaintext) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(Value::Map(Map::new())),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    position = e.position(),
                    "session cookie payload did not decode"
                );
                Err(e.into())
            }
        }
    }

    /// Extracts the session id a cookie refers to.
    ///
    /// Short cookies (32 bytes or less) are the bare id. Longer ones are
    /// decrypted and the `session_id` string entry is returned, if any.
    pub fn session_id_from_cookie(&self, text: &str) -> Result<Option<String>, CookieError> {
        if is_bare_session_id(text) {
            return Ok(Some(text.to_string()));
        }
        let value = self.decrypt_cookie(text)?;
        Ok(value
            .get(SESSION_ID_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

/// Returns true if `text` is short enough to be a bare session id rather
/// than encrypted cookie data.
pub fn is_bare_session_id(text: &str) -> bool {
    text.len() <= MAX_BARE_SESSION_ID_LEN
}

/// Encrypts `value` into cookie text under `raw_key`.
pub fn encrypt_cookie(value: &Value, raw_key: impl AsRef<[u8]>) -> Result<String, CryptoError> {
    SessionCrypto::new(raw_key).encrypt_cookie(value)
}

/// Decrypts cookie text under `raw_key`. Empty text gives an empty map.
pub fn decrypt_cookie(text: &str, raw_key: impl AsRef<[u8]>) -> Result<Value, CookieError> {
    SessionCrypto::new(raw_key).decrypt_cookie(text)
}

/// Generates a new session id: 32 lowercase hex characters from the OS RNG.
pub fn generate_session_id() -> Result<String, CryptoError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(hex::encode(bytes))
}
