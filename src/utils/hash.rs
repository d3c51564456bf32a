//! Content fingerprints for cache-busting filenames.
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint(b"body{color:red}"); // -> "a1b2c3d4"
//! ```

/// Width of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute the blake3 digest of `data` and return its first 4 bytes as hex.
///
/// Same bytes always produce the same fingerprint, so unchanged assets keep
/// their filenames across builds.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    let digest = blake3::hash(data.as_ref());
    hex::encode(&digest.as_bytes()[..FINGERPRINT_LEN / 2])
}

/// Check whether `s` looks like a fingerprint produced by [`fingerprint`].
pub fn is_fingerprint(s: &str) -> bool {
    s.len() == FINGERPRINT_LEN && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
