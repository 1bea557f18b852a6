//! Opening a vault for inspection, and extracting objects from it.
//!
//! `open_for_view` performs the full verification protocol: size sanity,
//! header and trailer magics, index bounds, key derivation, and the index
//! MAC.  A MAC mismatch cannot be attributed to either a wrong password
//! or a tampered file, so one error message covers both.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::crypto::kdf::{self, KeyPair};
use crate::crypto::{mac, object};
use crate::errors::{Result, VaultError};
use crate::vault::format::{
    GlobalHeader, IndexTrailer, GLOBAL_HEADER_SIZE, INDEX_MAGIC, INDEX_TRAILER_SIZE,
    MAX_INDEX_SIZE, VAULT_MAGIC,
};
use crate::vault::index::{self, path_matches_prefix, Index, ObjType};

/// Everything a successful open yields.  The derived keys live exactly
/// as long as this value.
#[derive(Debug)]
pub struct VaultOpen {
    pub header: GlobalHeader,
    pub trailer: IndexTrailer,
    pub index: Index,
    pub keys: KeyPair,
}

fn integrity(msg: &str) -> VaultError {
    VaultError::Integrity(msg.into())
}

/// Open `path`, verify the container, and decode the index.
pub fn open_for_view(path: &Path, password: &str) -> Result<VaultOpen> {
    let mut file =
        File::open(path).map_err(|_| VaultError::Io("open vault failed".into()))?;

    let fsz = file
        .metadata()
        .map_err(|_| VaultError::Io("stat vault failed".into()))?
        .len();

    if fsz < (GLOBAL_HEADER_SIZE + INDEX_TRAILER_SIZE) as u64 {
        return Err(integrity("truncated vault (too small)"));
    }

    let mut hdr_buf = [0u8; GLOBAL_HEADER_SIZE];
    file.read_exact(&mut hdr_buf)
        .map_err(|_| VaultError::Io("read header failed".into()))?;
    let header = GlobalHeader::decode(&hdr_buf)?;

    if header.magic != VAULT_MAGIC {
        return Err(integrity("bad magic"));
    }
    if header.header_size < GLOBAL_HEADER_SIZE as u32 || u64::from(header.header_size) > fsz {
        return Err(integrity("bad header_size"));
    }

    let trailer_pos = fsz - INDEX_TRAILER_SIZE as u64;
    file.seek(SeekFrom::Start(trailer_pos))
        .map_err(|_| VaultError::Io("seek trailer failed".into()))?;

    let mut tr_buf = [0u8; INDEX_TRAILER_SIZE];
    file.read_exact(&mut tr_buf)
        .map_err(|_| VaultError::Io("read trailer failed".into()))?;
    let trailer = IndexTrailer::decode(&tr_buf)?;

    if trailer.magic != INDEX_MAGIC {
        return Err(integrity("bad trailer magic"));
    }
    if trailer.trailer_size != INDEX_TRAILER_SIZE as u32 {
        return Err(integrity("bad trailer_size"));
    }

    let idx_off = trailer.index_offset;
    let idx_sz = trailer.index_size;

    if idx_sz == 0 || idx_sz > MAX_INDEX_SIZE {
        return Err(integrity("bad index_size"));
    }
    if idx_off < u64::from(header.header_size) {
        return Err(integrity("bad index_offset"));
    }
    if idx_off > trailer_pos {
        return Err(integrity("index_offset beyond trailer"));
    }
    if idx_off + idx_sz != trailer_pos {
        return Err(integrity("truncated vault (index does not meet trailer)"));
    }

    file.seek(SeekFrom::Start(idx_off))
        .map_err(|_| VaultError::Io("seek index failed".into()))?;
    let mut idx_bytes = vec![0u8; idx_sz as usize];
    file.read_exact(&mut idx_bytes)
        .map_err(|_| VaultError::Io("read index failed".into()))?;

    // Zeroed reserved fields mean a legacy writer: 512-bit keys, cost 1.
    let key_bits = match header.key_bits() {
        0 => 512,
        b => b as usize,
    };
    let kdf_cost = match header.kdf_cost() {
        0 => 1,
        c => c,
    };

    let keys = kdf::derive(
        password.as_bytes(),
        &header.salt,
        kdf::bits_to_bytes(key_bits),
        kdf_cost,
    )?;

    if !mac::verify(&keys.mac, &idx_bytes, &trailer.index_tag)? {
        return Err(integrity("wrong password or corrupted vault"));
    }

    let index = index::decode_index(&idx_bytes)?;

    // Every file object must lie inside the object region.
    for e in &index.entries {
        if e.obj_type == ObjType::File
            && (e.data_offset < u64::from(header.header_size)
                || e.data_offset.saturating_add(e.data_size) > idx_off)
        {
            return Err(integrity("index: object bounds out of range"));
        }
    }

    Ok(VaultOpen {
        header,
        trailer,
        index,
        keys,
    })
}

/// Extract entries to `out_dir`.
///
/// `select` filters by the prefix rule; an empty slice matches
/// everything.  With `materialize_dirs` every non-deleted Dir entry is
/// created even when it holds no files.  Returns the number of files
/// written.
pub fn extract_to_dir(
    vo: &VaultOpen,
    vault_path: &Path,
    out_dir: &Path,
    select: &[String],
    include_hidden: bool,
    materialize_dirs: bool,
) -> Result<u64> {
    let mut vault_file = File::open(vault_path)
        .map_err(|_| VaultError::Io("extract: cannot open vault file".into()))?;

    fs::create_dir_all(out_dir)?;

    let wanted = |entry_path: &str| -> bool {
        select.is_empty() || select.iter().any(|w| path_matches_prefix(w, entry_path))
    };

    if materialize_dirs {
        for e in &vo.index.entries {
            if e.obj_type != ObjType::Dir || e.is_deleted() {
                continue;
            }
            if e.is_hidden() && !include_hidden {
                continue;
            }
            if !wanted(&e.path) {
                continue;
            }
            fs::create_dir_all(out_dir.join(&e.path))?;
        }
    }

    let mut extracted = 0u64;

    for e in &vo.index.entries {
        if e.obj_type != ObjType::File || e.is_deleted() {
            continue;
        }
        if e.is_hidden() && !include_hidden {
            continue;
        }
        if !wanted(&e.path) {
            continue;
        }

        let out_path = out_dir.join(&e.path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out_file = File::create(&out_path)
            .map_err(|_| VaultError::Io("extract: cannot create output file".into()))?;

        vault_file
            .seek(SeekFrom::Start(e.data_offset))
            .map_err(|_| VaultError::Io("extract: seek failed".into()))?;

        object::decrypt_stream(
            &mut vault_file,
            &mut out_file,
            &vo.keys.enc,
            &vo.keys.mac,
            &e.nonce,
            e.data_size,
            &e.tag,
        )?;

        extracted += 1;
    }

    Ok(extracted)
}
