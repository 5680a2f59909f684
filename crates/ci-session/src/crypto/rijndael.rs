//! Generalized Rijndael block cipher.
//!
//! AES fixes the block at 16 bytes. The legacy cookie scheme uses Rijndael
//! with a 32-byte block, which no AES implementation provides, so this module
//! implements the full family: block and key sizes of 16, 24 or 32 bytes.
//!
//! The state is laid out column-major like the reference implementation:
//! byte `r + 4c` of a block is row `r`, column `c`.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// A keyed block cipher operating in place on single blocks.
pub trait BlockCipher {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypts one block in place. `block.len()` must equal [`Self::block_size`].
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypts one block in place. `block.len()` must equal [`Self::block_size`].
    fn decrypt_block(&self, block: &mut [u8]);
}

const SBOX: [u8; 256] = build_sbox();
const INV_SBOX: [u8; 256] = invert(&SBOX);

/// Builds the S-box by walking the multiplicative group with generator 3.
const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    let mut p: u8 = 1;
    let mut q: u8 = 1;
    loop {
        // p *= 3
        p = p ^ (p << 1) ^ (if p & 0x80 != 0 { 0x1b } else { 0 });
        // q /= 3
        q ^= q << 1;
        q ^= q << 2;
        q ^= q << 4;
        if q & 0x80 != 0 {
            q ^= 0x09;
        }
        let affine =
            q ^ q.rotate_left(1) ^ q.rotate_left(2) ^ q.rotate_left(3) ^ q.rotate_left(4);
        sbox[p as usize] = affine ^ 0x63;
        if p == 1 {
            break;
        }
    }
    // Zero has no inverse.
    sbox[0] = 0x63;
    sbox
}

const fn invert(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

#[inline]
fn xtime(a: u8) -> u8 {
    (a << 1) ^ (if a & 0x80 != 0 { 0x1b } else { 0 })
}

#[inline]
fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut r = 0;
    while b != 0 {
        if b & 1 != 0 {
            r ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    r
}

/// Row shift offsets, indexed by block size in 32-bit words.
fn shift_offsets(nb: usize) -> [usize; 4] {
    match nb {
        8 => [0, 1, 3, 4],
        _ => [0, 1, 2, 3],
    }
}

fn check_size(len: usize) -> Option<usize> {
    matches!(len, 16 | 24 | 32).then_some(len / 4)
}

/// Rijndael with an expanded key schedule.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Rijndael {
    /// Block size in 32-bit words.
    nb: usize,
    rounds: usize,
    /// `nb * (rounds + 1)` words of four bytes.
    round_keys: Vec<[u8; 4]>,
}

impl std::fmt::Debug for Rijndael {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rijndael")
            .field("block_size", &(self.nb * 4))
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}

impl Rijndael {
    /// Expands `key` for the given block size.
    pub fn new(key: &[u8], block_size: usize) -> Result<Self, CryptoError> {
        let nk = check_size(key.len()).ok_or(CryptoError::InvalidKeyLength(key.len()))?;
        let nb = check_size(block_size).ok_or(CryptoError::InvalidBlockSize(block_size))?;
        Ok(Self::expand(key, nk, nb))
    }

    /// Rijndael-256: 32-byte key, 32-byte block. Cannot fail.
    pub fn new_256(key: &[u8; 32]) -> Self {
        Self::expand(key, 8, 8)
    }

    fn expand(key: &[u8], nk: usize, nb: usize) -> Self {
        let rounds = nk.max(nb) + 6;
        let total = nb * (rounds + 1);

        let mut round_keys: Vec<[u8; 4]> = Vec::with_capacity(total);
        for chunk in key.chunks_exact(4) {
            round_keys.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut rcon: u8 = 1;
        for i in nk..total {
            let mut temp = round_keys[i - 1];
            if i % nk == 0 {
                temp.rotate_left(1);
                for b in temp.iter_mut() {
                    *b = SBOX[*b as usize];
                }
                temp[0] ^= rcon;
                rcon = xtime(rcon);
            } else if nk > 6 && i % nk == 4 {
                for b in temp.iter_mut() {
                    *b = SBOX[*b as usize];
                }
            }
            let prev = round_keys[i - nk];
            round_keys.push([
                prev[0] ^ temp[0],
                prev[1] ^ temp[1],
                prev[2] ^ temp[2],
                prev[3] ^ temp[3],
            ]);
        }

        Self {
            nb,
            rounds,
            round_keys,
        }
    }

    /// Number of rounds (10 to 14 depending on key and block size).
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn add_round_key(&self, state: &mut [u8], round: usize) {
        let words = &self.round_keys[round * self.nb..(round + 1) * self.nb];
        for (column, word) in state.chunks_exact_mut(4).zip(words) {
            for (b, k) in column.iter_mut().zip(word) {
                *b ^= k;
            }
        }
    }

    fn shift_rows(&self, state: &mut [u8], inverse: bool) {
        let nb = self.nb;
        let offsets = shift_offsets(nb);
        let mut old = [0u8; 32];
        old[..state.len()].copy_from_slice(state);
        for (row, &shift) in offsets.iter().enumerate().skip(1) {
            for col in 0..nb {
                let src = (col + shift) % nb;
                if inverse {
                    state[4 * src + row] = old[4 * col + row];
                } else {
                    state[4 * col + row] = old[4 * src + row];
                }
            }
        }
        old.zeroize();
    }

    fn mix_columns(state: &mut [u8]) {
        for col in state.chunks_exact_mut(4) {
            let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
            col[0] = gmul(a0, 2) ^ gmul(a1, 3) ^ a2 ^ a3;
            col[1] = a0 ^ gmul(a1, 2) ^ gmul(a2, 3) ^ a3;
            col[2] = a0 ^ a1 ^ gmul(a2, 2) ^ gmul(a3, 3);
            col[3] = gmul(a0, 3) ^ a1 ^ a2 ^ gmul(a3, 2);
        }
    }

    fn inv_mix_columns(state: &mut [u8]) {
        for col in state.chunks_exact_mut(4) {
            let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
            col[0] = gmul(a0, 14) ^ gmul(a1, 11) ^ gmul(a2, 13) ^ gmul(a3, 9);
            col[1] = gmul(a0, 9) ^ gmul(a1, 14) ^ gmul(a2, 11) ^ gmul(a3, 13);
            col[2] = gmul(a0, 13) ^ gmul(a1, 9) ^ gmul(a2, 14) ^ gmul(a3, 11);
            col[3] = gmul(a0, 11) ^ gmul(a1, 13) ^ gmul(a2, 9) ^ gmul(a3, 14);
        }
    }
}

impl BlockCipher for Rijndael {
    fn block_size(&self) -> usize {
        self.nb * 4
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), self.block_size(), "block length mismatch");
        self.add_round_key(block, 0);
        for round in 1..=self.rounds {
            for b in block.iter_mut() {
                *b = SBOX[*b as usize];
            }
            self.shift_rows(block, false);
            if round != self.rounds {
                Self::mix_columns(block);
            }
            self.add_round_key(block, round);
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), self.block_size(), "block length mismatch");
        self.add_round_key(block, self.rounds);
        for round in (0..self.rounds).rev() {
            self.shift_rows(block, true);
            for b in block.iter_mut() {
                *b = INV_SBOX[*b as usize];
            }
            self.add_round_key(block, round);
            if round != 0 {
                Self::inv_mix_columns(block);
            }
        }
    }
}
