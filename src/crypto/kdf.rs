//! Password-based key derivation.
//!
//! The password is stretched by iterating the salted hash `cost` times;
//! each round feeds the previous state plus a little-endian round counter
//! back in.  One derivation yields both halves of the key material: the
//! encryption key and the MAC key.

use zeroize::{Zeroize, Zeroizing};

use crate::crypto::hash::hash_strong;
use crate::errors::{Result, VaultError};

/// Default key size in bits when the caller does not override it.
pub const DEFAULT_KEY_BITS: usize = 1024;

/// Default KDF iteration count.
pub const DEFAULT_KDF_COST: u32 = 50_000;

const CTX_FIRST: &str = "1654|KDF|0";
const CTX_ROUND: &str = "1654|KDF|R";

/// Round a bit count up to whole bytes.
pub const fn bits_to_bytes(bits: usize) -> usize {
    (bits + 7) / 8
}

/// The derived key pair.  Both halves are wiped on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct KeyPair {
    /// Stream-cipher key.
    pub enc: Vec<u8>,
    /// MAC key.
    pub mac: Vec<u8>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

/// Derive `(enc_key, mac_key)` from a password and salt.
///
/// `key_bytes` is the length of each half; `cost` is the iteration count
/// (`0` is clamped to `1`).  The same inputs always produce the same keys.
pub fn derive(password: &[u8], salt: &[u8], key_bytes: usize, cost: u32) -> Result<KeyPair> {
    if key_bytes == 0 {
        return Err(VaultError::Crypto("kdf: key_bytes must be non-zero".into()));
    }
    let cost = cost.max(1);

    let out_bits = key_bytes * 2 * 8;

    let mut state = Zeroizing::new(hash_strong(password, salt, CTX_FIRST, out_bits)?);

    for i in 1..cost {
        let mut msg = Zeroizing::new(Vec::with_capacity(state.len() + 4));
        msg.extend_from_slice(&state);
        msg.extend_from_slice(&i.to_le_bytes());
        let next = hash_strong(&msg, salt, CTX_ROUND, out_bits)?;
        state.zeroize();
        *state = next;
    }

    if state.len() < key_bytes * 2 {
        return Err(VaultError::Crypto("kdf: hash returned too few bytes".into()));
    }

    Ok(KeyPair {
        enc: state[..key_bytes].to_vec(),
        mac: state[key_bytes..key_bytes * 2].to_vec(),
    })
}
