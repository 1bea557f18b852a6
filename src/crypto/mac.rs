//! Keyed message authentication over the domain-tagged hash.

use subtle::ConstantTimeEq;

use crate::crypto::hash::hash_strong;
use crate::errors::Result;

/// Authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

const CTX_MAC: &str = "1654|MAC";

/// Compute a 16-byte tag over `data` under `key`.
pub fn compute(key: &[u8], data: &[u8]) -> Result<[u8; TAG_SIZE]> {
    let full = hash_strong(data, key, CTX_MAC, 256)?;
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&full[..TAG_SIZE]);
    Ok(tag)
}

/// Recompute the tag and compare in constant time.
///
/// All 16 bytes are always compared; a length mismatch is simply `false`.
pub fn verify(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool> {
    let computed = compute(key, data)?;
    Ok(computed.as_slice().ct_eq(tag).into())
}
