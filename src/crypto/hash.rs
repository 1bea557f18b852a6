//! Domain-tagged hash over the sponge XOF.
//!
//! Two entry points: [`hash`] for context-separated hashing and
//! [`hash_strong`] for salted hashing.  Both absorb a fixed framing of
//! domain literals so that context, message, and salt can never collide,
//! and both produce arbitrary-length output (minimum 256 bits).

use crate::crypto::sponge::SpongeXof;
use crate::errors::{Result, VaultError};

const INIT_DOM: &[u8] = b"PETORON:INIT:v1";
const CTX_DOM: &[u8] = b"PETORON:CTX:v1";
const MSG_DOM: &[u8] = b"PETORON:MSG:v1";
const SALT_DOM: &[u8] = b"PETORON:SALT:v1";
const FINAL_DOM: &[u8] = b"PETORON:FINAL:v1";

/// Smallest permitted output size in bits.
pub const MIN_OUT_BITS: usize = 256;

fn absorb_len_le(x: &mut SpongeXof, len: u64) {
    x.absorb(&len.to_le_bytes());
}

/// Absorb `tag`, then the payload length as LE64, then the payload.
/// The tag itself carries no length prefix.
fn absorb_tagged(x: &mut SpongeXof, tag: &[u8], data: &[u8]) {
    x.absorb(tag);
    absorb_len_le(x, data.len() as u64);
    if !data.is_empty() {
        x.absorb(data);
    }
}

fn hash_core(msg: &[u8], salt: &[u8], context: &str, out_bits: usize) -> Vec<u8> {
    let out_len = (out_bits + 7) / 8;
    let mut out = vec![0u8; out_len];

    let mut x = SpongeXof::new();

    x.absorb(INIT_DOM);
    absorb_tagged(&mut x, CTX_DOM, context.as_bytes());
    absorb_tagged(&mut x, MSG_DOM, msg);
    if !salt.is_empty() {
        absorb_tagged(&mut x, SALT_DOM, salt);
    }
    x.absorb(FINAL_DOM);
    x.absorb_domain_pad(0x1f);

    x.squeeze(&mut out);
    out
}

/// Hash `msg` under `context`, producing `ceil(out_bits / 8)` bytes.
pub fn hash(msg: &[u8], context: &str, out_bits: usize) -> Result<Vec<u8>> {
    if out_bits < MIN_OUT_BITS {
        return Err(VaultError::Crypto("hash: out_bits must be >= 256".into()));
    }
    Ok(hash_core(msg, &[], context, out_bits))
}

/// Salted variant of [`hash`].  The salt must be non-empty.
pub fn hash_strong(msg: &[u8], salt: &[u8], context: &str, out_bits: usize) -> Result<Vec<u8>> {
    if out_bits < MIN_OUT_BITS {
        return Err(VaultError::Crypto("hash: out_bits must be >= 256".into()));
    }
    if salt.is_empty() {
        return Err(VaultError::Crypto(
            "hash: salt is required in strong mode".into(),
        ));
    }
    Ok(hash_core(msg, salt, context, out_bits))
}
