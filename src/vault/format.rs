//! Binary container format: global header and index trailer.
//!
//! A vault file has this layout:
//!
//! ```text
//! [header: 100 bytes][object ciphertext...][encoded index][trailer: 40 bytes]
//! ```
//!
//! - **Global header**: magic `"1654"`, version, header size, KDF salt,
//!   header nonce, and a reserved block carrying `key_bits` and
//!   `kdf_cost` as LE32 values.
//! - **Object region**: raw ciphertext only; the index is the sole
//!   source of truth for object boundaries.
//! - **Trailer**: magic `"IDX1"`, the index location, and the MAC tag
//!   authenticating the encoded index.  Always the last 40 bytes.
//!
//! All multi-byte integers are little-endian.

use crate::crypto::mac::TAG_SIZE;
use crate::errors::{Result, VaultError};

/// Magic bytes at the start of every vault file.
pub const VAULT_MAGIC: [u8; 4] = *b"1654";

/// Magic bytes of the index trailer.
pub const INDEX_MAGIC: [u8; 4] = *b"IDX1";

/// Current container format version.
pub const VERSION: u32 = 1;

/// KDF salt length in bytes.
pub const SALT_SIZE: usize = 32;

/// Object nonce length in bytes.
pub const NONCE_SIZE: usize = 24;

/// Fixed global header size: 4 + 4 + 4 + 32 + 24 + 32.
pub const GLOBAL_HEADER_SIZE: usize = 100;

/// Fixed trailer size: 4 + 4 + 8 + 8 + 16.
pub const INDEX_TRAILER_SIZE: usize = 40;

/// Upper bound on the encoded index accepted by the reader.
pub const MAX_INDEX_SIZE: u64 = 64 * 1024 * 1024;

/// Vault file extension, enforced by the writer.
pub const VAULT_EXTENSION: &str = "1654";

/// The fixed-size header at offset zero.
#[derive(Debug, Clone)]
pub struct GlobalHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub header_size: u32,
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub reserved: [u8; 32],
}

impl GlobalHeader {
    /// Build a fresh header with `key_bits` and `kdf_cost` packed into
    /// the reserved block.
    pub fn new(
        salt: [u8; SALT_SIZE],
        nonce: [u8; NONCE_SIZE],
        key_bits: u32,
        kdf_cost: u32,
    ) -> Self {
        let mut reserved = [0u8; 32];
        reserved[0..4].copy_from_slice(&key_bits.to_le_bytes());
        reserved[4..8].copy_from_slice(&kdf_cost.to_le_bytes());
        Self {
            magic: VAULT_MAGIC,
            version: VERSION,
            header_size: GLOBAL_HEADER_SIZE as u32,
            salt,
            nonce,
            reserved,
        }
    }

    pub fn encode(&self) -> [u8; GLOBAL_HEADER_SIZE] {
        let mut buf = [0u8; GLOBAL_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.header_size.to_le_bytes());
        buf[12..44].copy_from_slice(&self.salt);
        buf[44..68].copy_from_slice(&self.nonce);
        buf[68..100].copy_from_slice(&self.reserved);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < GLOBAL_HEADER_SIZE {
            return Err(VaultError::Integrity("truncated header".into()));
        }
        let mut h = Self {
            magic: [0u8; 4],
            version: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            header_size: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            salt: [0u8; SALT_SIZE],
            nonce: [0u8; NONCE_SIZE],
            reserved: [0u8; 32],
        };
        h.magic.copy_from_slice(&buf[0..4]);
        h.salt.copy_from_slice(&buf[12..44]);
        h.nonce.copy_from_slice(&buf[44..68]);
        h.reserved.copy_from_slice(&buf[68..100]);
        Ok(h)
    }

    /// `key_bits` from the reserved block; zero means a legacy writer.
    pub fn key_bits(&self) -> u32 {
        u32::from_le_bytes(self.reserved[0..4].try_into().unwrap())
    }

    /// `kdf_cost` from the reserved block; zero means a legacy writer.
    pub fn kdf_cost(&self) -> u32 {
        u32::from_le_bytes(self.reserved[4..8].try_into().unwrap())
    }
}

/// The fixed-size trailer at the end of the file.
#[derive(Debug, Clone)]
pub struct IndexTrailer {
    pub magic: [u8; 4],
    pub trailer_size: u32,
    pub index_offset: u64,
    pub index_size: u64,
    pub index_tag: [u8; TAG_SIZE],
}

impl IndexTrailer {
    pub fn new(index_offset: u64, index_size: u64, index_tag: [u8; TAG_SIZE]) -> Self {
        Self {
            magic: INDEX_MAGIC,
            trailer_size: INDEX_TRAILER_SIZE as u32,
            index_offset,
            index_size,
            index_tag,
        }
    }

    pub fn encode(&self) -> [u8; INDEX_TRAILER_SIZE] {
        let mut buf = [0u8; INDEX_TRAILER_SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..8].copy_from_slice(&self.trailer_size.to_le_bytes());
        buf[8..16].copy_from_slice(&self.index_offset.to_le_bytes());
        buf[16..24].copy_from_slice(&self.index_size.to_le_bytes());
        buf[24..40].copy_from_slice(&self.index_tag);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < INDEX_TRAILER_SIZE {
            return Err(VaultError::Integrity("truncated trailer".into()));
        }
        let mut t = Self {
            magic: [0u8; 4],
            trailer_size: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            index_offset: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            index_size: u64::from_le_bytes(buf[16..24].try_into().unwrap()),
            index_tag: [0u8; TAG_SIZE],
        };
        t.magic.copy_from_slice(&buf[0..4]);
        t.index_tag.copy_from_slice(&buf[24..40]);
        Ok(t)
    }
}
