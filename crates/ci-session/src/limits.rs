//! Limits and fixed parameters of the legacy format.

/// Maximum container nesting depth accepted by the decoder.
pub const MAX_DEPTH: usize = 512;

/// Upper bound on elements preallocated for a container before its pairs are read.
///
/// Count fields come from untrusted input; larger arrays still decode, they
/// just grow as pairs arrive.
pub const MAX_PREALLOC: usize = 1024;

/// Rijndael block size used by the legacy cookie scheme, in bytes.
pub const BLOCK_SIZE: usize = 32;

/// Length of the IV prepended to every encrypted payload, in bytes.
pub const IV_LEN: usize = BLOCK_SIZE;

/// Cookies at most this long carry a bare session id instead of encrypted data.
pub const MAX_BARE_SESSION_ID_LEN: usize = 32;

/// User agents are cut to this many characters when truncation is enabled.
pub const USER_AGENT_MAX_CHARS: usize = 120;
