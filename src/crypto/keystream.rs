//! Counter-mode keystream from the XOF.
//!
//! Each 64 KiB chunk of an object gets its own keystream, generated from
//! scratch as `hash_strong(nonce || LE64(counter), key, "1654|XOF")`.
//! The per-chunk regeneration (rather than one continuous squeeze) is
//! load-bearing: existing vaults are encrypted this way.

use crate::crypto::hash::hash_strong;
use crate::errors::{Result, VaultError};

/// Object chunk size; every chunk except the last is exactly this long.
pub const CHUNK_SIZE: usize = 64 * 1024;

const CTX_XOF: &str = "1654|XOF";

/// Fill `out` with the keystream for chunk `counter`.
pub fn generate(key: &[u8], nonce: &[u8], counter: u64, out: &mut [u8]) -> Result<()> {
    let mut msg = Vec::with_capacity(nonce.len() + 8);
    msg.extend_from_slice(nonce);
    msg.extend_from_slice(&counter.to_le_bytes());

    let out_bits = (out.len() * 8).max(256);
    let ks = hash_strong(&msg, key, CTX_XOF, out_bits)?;
    if ks.len() < out.len() {
        return Err(VaultError::Crypto("xof: hash returned too few bytes".into()));
    }

    out.copy_from_slice(&ks[..out.len()]);
    Ok(())
}
