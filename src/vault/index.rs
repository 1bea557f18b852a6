//! The vault index: an ordered list of object entries.
//!
//! The index is append-only.  Mutations never rewrite old entries;
//! deletion sets a flag and replacement appends a newer entry under the
//! same path, so "last visible entry wins" when a path occurs twice.
//!
//! Encoded layout (all integers LE):
//!
//! ```text
//! [magic u32][version u32][count u32]
//! per entry: [path_len u32][path][type u8][flags u32][size u64]
//!            [data_offset u64][data_size u64][nonce 24B][tag 16B]
//! ```
//!
//! Trailing bytes after the declared count are a format error.

use crate::crypto::mac::TAG_SIZE;
use crate::errors::{Result, VaultError};
use crate::vault::format::NONCE_SIZE;

const IDX_MAGIC: u32 = 0x3158_4449;
const IDX_VERSION: u32 = 1;

/// Longest accepted in-vault path in bytes.
pub const MAX_PATH_LEN: usize = 4096;

/// Entry is visible in normal listings.
pub const F_VISIBLE: u32 = 1;
/// Entry is hidden from listings unless explicitly requested.
pub const F_HIDDEN: u32 = 1 << 1;
/// Entry is logically deleted; its ciphertext bytes remain in place.
pub const F_DELETED: u32 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjType {
    File = 1,
    Dir = 2,
}

/// One object in the vault.
///
/// Dir entries carry no data: offset, size, nonce, and tag are all zero.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: String,
    pub obj_type: ObjType,
    pub flags: u32,
    pub size: u64,
    pub data_offset: u64,
    pub data_size: u64,
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
}

impl Entry {
    /// A visible directory entry with zeroed crypto fields.
    pub fn new_dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            obj_type: ObjType::Dir,
            flags: F_VISIBLE,
            size: 0,
            data_offset: 0,
            data_size: 0,
            nonce: [0u8; NONCE_SIZE],
            tag: [0u8; TAG_SIZE],
        }
    }

    /// A visible file entry; data fields are filled once the object is
    /// encrypted into place.
    pub fn new_file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            obj_type: ObjType::File,
            flags: F_VISIBLE,
            size,
            data_offset: 0,
            data_size: 0,
            nonce: [0u8; NONCE_SIZE],
            tag: [0u8; TAG_SIZE],
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.flags & F_DELETED != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.flags & F_HIDDEN != 0
    }
}

/// `true` when `path` equals `prefix` or lives under `prefix + "/"`.
pub fn path_matches_prefix(prefix: &str, path: &str) -> bool {
    if prefix == path {
        return true;
    }
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'/'
}

/// Ordered sequence of entries; insertion order is preserved on disk.
#[derive(Debug, Clone, Default)]
pub struct Index {
    pub entries: Vec<Entry>,
}

impl Index {
    /// Is there a non-deleted entry (of any type) at exactly `path`?
    pub fn contains_live(&self, path: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.path == path && !e.is_deleted())
    }

    /// Is there a non-deleted Dir entry at exactly `path`?
    pub fn has_dir(&self, path: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.path == path && e.obj_type == ObjType::Dir && !e.is_deleted())
    }

    /// Push a visible Dir entry unless one already exists.
    pub fn push_dir(&mut self, path: &str) {
        if path.is_empty() || self.has_dir(path) {
            return;
        }
        self.entries.push(Entry::new_dir(path));
    }

    /// Make sure every ancestor directory of `full_path` has an entry.
    pub fn ensure_parent_dirs(&mut self, full_path: &str) {
        let bytes = full_path.as_bytes();
        for pos in 0..bytes.len() {
            if bytes[pos] == b'/' {
                let dir = &full_path[..pos];
                if !dir.is_empty() && !self.has_dir(dir) {
                    self.entries.push(Entry::new_dir(dir));
                }
            }
        }
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    off: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.off + n > self.data.len() {
            return Err(VaultError::Integrity(format!("index: truncated ({what})")));
        }
        let s = &self.data[self.off..self.off + n];
        self.off += n;
        Ok(s)
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4, what)?.try_into().unwrap()))
    }

    fn u64(&mut self, what: &str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8, what)?.try_into().unwrap()))
    }
}

/// Serialise the index to its on-disk encoding.
pub fn encode_index(idx: &Index) -> Vec<u8> {
    let mut out = Vec::with_capacity(64 + idx.entries.len() * 128);

    out.extend_from_slice(&IDX_MAGIC.to_le_bytes());
    out.extend_from_slice(&IDX_VERSION.to_le_bytes());
    out.extend_from_slice(&(idx.entries.len() as u32).to_le_bytes());

    for e in &idx.entries {
        out.extend_from_slice(&(e.path.len() as u32).to_le_bytes());
        out.extend_from_slice(e.path.as_bytes());
        out.push(e.obj_type as u8);
        out.extend_from_slice(&e.flags.to_le_bytes());
        out.extend_from_slice(&e.size.to_le_bytes());
        out.extend_from_slice(&e.data_offset.to_le_bytes());
        out.extend_from_slice(&e.data_size.to_le_bytes());
        out.extend_from_slice(&e.nonce);
        out.extend_from_slice(&e.tag);
    }

    out
}

/// Parse an encoded index, rejecting any under- or overrun.
pub fn decode_index(data: &[u8]) -> Result<Index> {
    let mut cur = Cursor { data, off: 0 };

    let magic = cur.u32("magic")?;
    let version = cur.u32("version")?;
    let count = cur.u32("count")?;

    if magic != IDX_MAGIC {
        return Err(VaultError::Integrity("index: bad magic".into()));
    }
    if version != IDX_VERSION {
        return Err(VaultError::Integrity("index: unsupported version".into()));
    }

    let mut idx = Index::default();
    idx.entries.reserve(count.min(1 << 16) as usize);

    for _ in 0..count {
        let path_len = cur.u32("path")? as usize;
        if path_len > MAX_PATH_LEN {
            return Err(VaultError::Integrity("index: path too long".into()));
        }
        let path_bytes = cur.take(path_len, "path")?;
        let path = std::str::from_utf8(path_bytes)
            .map_err(|_| VaultError::Integrity("index: path is not valid UTF-8".into()))?
            .to_string();

        let type_u8 = cur.take(1, "type")?[0];
        let obj_type = if type_u8 == ObjType::Dir as u8 {
            ObjType::Dir
        } else {
            ObjType::File
        };

        let flags = cur.u32("flags")?;
        let size = cur.u64("size")?;
        let data_offset = cur.u64("data_offset")?;
        let data_size = cur.u64("data_size")?;

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(cur.take(NONCE_SIZE, "nonce")?);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(cur.take(TAG_SIZE, "tag")?);

        idx.entries.push(Entry {
            path,
            obj_type,
            flags,
            size,
            data_offset,
            data_size,
            nonce,
            tag,
        });
    }

    if cur.off != data.len() {
        return Err(VaultError::Integrity("index: trailing bytes".into()));
    }

    Ok(idx)
}
