//! Cipher block chaining with zero-byte padding.
//!
//! Padding appends `0x00` up to the next block boundary and is not removed on
//! decryption: it is not self-describing, so the payload must carry its own
//! length.

use crate::crypto::rijndael::BlockCipher;
use crate::error::CryptoError;

/// Pads `data` with zero bytes to a multiple of `block_size`.
///
/// Input already on a boundary (including empty input) is left as is.
pub fn zero_pad(data: &mut Vec<u8>, block_size: usize) {
    let rem = data.len() % block_size;
    if rem != 0 {
        data.resize(data.len() + block_size - rem, 0);
    }
}

/// Encrypts `plaintext` under `iv`, padding it with zeros first.
pub fn encrypt<C: BlockCipher>(
    cipher: &C,
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let block_size = cipher.block_size();
    check_iv(iv, block_size)?;

    let mut buf = plaintext.to_vec();
    zero_pad(&mut buf, block_size);

    let mut prev = iv.to_vec();
    for block in buf.chunks_exact_mut(block_size) {
        for (b, p) in block.iter_mut().zip(&prev) {
            *b ^= p;
        }
        cipher.encrypt_block(block);
        prev.copy_from_slice(block);
    }
    Ok(buf)
}

/// Decrypts `ciphertext` under `iv`. Zero padding is left in the result.
pub fn decrypt<C: BlockCipher>(
    cipher: &C,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let block_size = cipher.block_size();
    check_iv(iv, block_size)?;
    if ciphertext.len() % block_size != 0 {
        return Err(CryptoError::InvalidCiphertextLength {
            len: ciphertext.len(),
            block_size,
        });
    }

    let mut out = ciphertext.to_vec();
    let mut prev = iv;
    for (block, cipher_block) in out
        .chunks_exact_mut(block_size)
        .zip(ciphertext.chunks_exact(block_size))
    {
        cipher.decrypt_block(block);
        for (b, p) in block.iter_mut().zip(prev) {
            *b ^= p;
        }
        prev = cipher_block;
    }
    Ok(out)
}

fn check_iv(iv: &[u8], block_size: usize) -> Result<(), CryptoError> {
    if iv.len() != block_size {
        return Err(CryptoError::TruncatedIv {
            len: iv.len(),
            iv_len: block_size,
        });
    }
    Ok(())
}
