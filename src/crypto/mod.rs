//! Cryptographic primitives, all built on one permutation.
//!
//! This module provides:
//! - The Keccak-f[1600] sponge and XOF interface (`sponge`)
//! - Domain-tagged hashing (`hash`)
//! - Password-based key derivation (`kdf`)
//! - Keyed authentication tags (`mac`)
//! - The counter-mode keystream (`keystream`)
//! - Chunked encrypt-then-MAC object processing (`object`)

pub mod hash;
pub mod kdf;
pub mod keystream;
pub mod mac;
pub mod object;
pub mod sponge;

pub use hash::{hash, hash_strong};
pub use kdf::{derive, KeyPair, DEFAULT_KDF_COST, DEFAULT_KEY_BITS};
pub use mac::TAG_SIZE;
