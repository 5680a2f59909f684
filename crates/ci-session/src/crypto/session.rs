//! The legacy cookie encryption scheme.
//!
//! ```text
//! derived_key = hex(md5(raw_key))                     32 ASCII bytes, used as-is
//! blob        = noise(iv || rijndael256_cbc(derived_key, iv, zero_pad(plaintext)))
//! ```
//!
//! There is no MAC. Decrypting with the wrong key succeeds and returns
//! garbage; only the payload decoder can tell.

use md5::{Digest, Md5};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::cbc;
use crate::crypto::noise::Noise;
use crate::crypto::rijndael::Rijndael;
use crate::error::CryptoError;
use crate::limits::IV_LEN;

/// Cipher key derived from the configured key: the lowercase hex MD5 text.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Returns the key bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the key as a fixed-size array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derives the cipher key from raw key material of any length.
pub fn derive_key(raw_key: impl AsRef<[u8]>) -> DerivedKey {
    let digest = Md5::digest(raw_key.as_ref());
    let mut key = [0u8; 32];
    // 16 digest bytes always fit 32 hex characters.
    let _ = hex::encode_to_slice(digest, &mut key);
    DerivedKey(key)
}

/// Encrypts and decrypts payloads under one key.
///
/// Holds the expanded cipher and noise mask; immutable and shareable across
/// threads once built.
#[derive(Clone, Debug)]
pub struct SessionCrypto {
    cipher: Rijndael,
    noise: Noise,
}

impl SessionCrypto {
    /// Derives the key and expands the cipher for `raw_key`.
    pub fn new(raw_key: impl AsRef<[u8]>) -> Self {
        let key = derive_key(raw_key);
        Self {
            cipher: Rijndael::new_256(key.as_bytes()),
            noise: Noise::new(key.as_slice()),
        }
    }

    /// Encrypts with a fresh random IV from the operating system.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;
        self.encrypt_with_iv(&iv, plaintext)
    }

    /// Encrypts with a caller-chosen IV. Reusing an IV leaks equal prefixes;
    /// use [`Self::encrypt`] outside fixtures.
    pub fn encrypt_with_iv(
        &self,
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = cbc::encrypt(&self.cipher, iv, plaintext)?;
        let mut blob = Vec::with_capacity(IV_LEN + ciphertext.len());
        blob.extend_from_slice(iv);
        blob.extend_from_slice(&ciphertext);
        self.noise.apply_in_place(&mut blob);
        tracing::trace!(
            plaintext_len = plaintext.len(),
            blob_len = blob.len(),
            "encrypted session payload"
        );
        Ok(blob)
    }

    /// Decrypts a blob produced by [`Self::encrypt`] or the legacy framework.
    ///
    /// Trailing zero padding is kept.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if blob.len() < IV_LEN {
            return Err(CryptoError::TruncatedIv {
                len: blob.len(),
                iv_len: IV_LEN,
            });
        }
        // The mask runs over IV and ciphertext as one stream.
        let unmasked = self.noise.remove(blob);
        let (iv, ciphertext) = unmasked.split_at(IV_LEN);
        let plaintext = cbc::decrypt(&self.cipher, iv, ciphertext)?;
        tracing::trace!(
            blob_len = blob.len(),
            plaintext_len = plaintext.len(),
            "decrypted session payload"
        );
        Ok(plaintext)
    }

    /// Returns `data` with this key's noise mask added.
    pub fn apply_noise(&self, data: &[u8]) -> Vec<u8> {
        self.noise.apply(data)
    }

    /// Returns `data` with this key's noise mask removed.
    pub fn remove_noise(&self, data: &[u8]) -> Vec<u8> {
        self.noise.remove(data)
    }
}

/// Encrypts `plaintext` under `raw_key`.
pub fn encrypt(plaintext: &[u8], raw_key: impl AsRef<[u8]>) -> Result<Vec<u8>, CryptoError> {
    SessionCrypto::new(raw_key).encrypt(plaintext)
}

/// Decrypts `blob` under `raw_key`, keeping zero padding.
pub fn decrypt(blob: &[u8], raw_key: impl AsRef<[u8]>) -> Result<Vec<u8>, CryptoError> {
    SessionCrypto::new(raw_key).decrypt(blob)
}

/// Adds the noise mask derived from `raw_key`.
pub fn apply_noise(data: &[u8], raw_key: impl AsRef<[u8]>) -> Vec<u8> {
    Noise::new(derive_key(raw_key).as_slice()).apply(data)
}

/// Removes the noise mask derived from `raw_key`.
pub fn remove_noise(data: &[u8], raw_key: impl AsRef<[u8]>) -> Vec<u8> {
    Noise::new(derive_key(raw_key).as_slice()).remove(data)
}
