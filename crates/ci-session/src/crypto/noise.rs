//! The legacy "noise" mask.
//!
//! After encrypting, the legacy framework adds a keyed byte stream to the IV
//! and ciphertext. The stream is the 40-character hex SHA-1 of the derived
//! key (itself the hex MD5 of the raw key), repeated; each data byte gets the
//! ASCII code of one hex character added modulo 256.

use sha1::{Digest, Sha1};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Keyed additive byte mask.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Noise {
    keystream: [u8; 40],
}

impl std::fmt::Debug for Noise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Noise").finish_non_exhaustive()
    }
}

impl Noise {
    /// Builds the mask from the derived (hex MD5) key.
    pub fn new(derived_key: &[u8]) -> Self {
        let digest = Sha1::digest(derived_key);
        let mut keystream = [0u8; 40];
        // 20 digest bytes always fit 40 hex characters.
        let _ = hex::encode_to_slice(digest, &mut keystream);
        Self { keystream }
    }

    /// The hex text cycled over the data.
    pub fn keystream(&self) -> &[u8] {
        &self.keystream
    }

    /// Adds the mask to `data` in place.
    pub fn apply_in_place(&self, data: &mut [u8]) {
        for (b, k) in data.iter_mut().zip(self.keystream.iter().cycle()) {
            *b = b.wrapping_add(*k);
        }
    }

    /// Subtracts the mask from `data` in place.
    pub fn remove_in_place(&self, data: &mut [u8]) {
        for (b, k) in data.iter_mut().zip(self.keystream.iter().cycle()) {
            *b = b.wrapping_sub(*k);
        }
    }

    /// Returns `data` with the mask added.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_in_place(&mut out);
        out
    }

    /// Returns `data` with the mask subtracted.
    pub fn remove(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.remove_in_place(&mut out);
        out
    }
}
