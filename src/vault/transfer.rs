//! Re-keying a vault: decrypt every selected object with the source
//! keys and re-encrypt it into a fresh container under new keys.
//!
//! The destination gets a brand-new salt, header nonce, and per-object
//! nonces, so no ciphertext byte can be copied across.  Objects are
//! piped chunk by chunk — decrypt a chunk, re-encrypt it — so only one
//! chunk of plaintext exists in memory at a time; the two ciphertext
//! streams are accumulated separately for their MAC tags.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use zeroize::Zeroize;

use crate::crypto::kdf::{self, KeyPair, DEFAULT_KDF_COST, DEFAULT_KEY_BITS};
use crate::crypto::keystream::{self, CHUNK_SIZE};
use crate::crypto::mac;
use crate::errors::{Result, VaultError};
use crate::vault::format::{GlobalHeader, IndexTrailer, NONCE_SIZE};
use crate::vault::index::{self, path_matches_prefix, Entry, Index, ObjType};
use crate::vault::reader;
use crate::vault::writer::{random_nonce, random_salt};

/// Pipe one object from the source vault into the destination, changing
/// keys and nonce.  Returns the rewritten entry.
fn reencrypt_object(
    src_file: &mut File,
    src_entry: &Entry,
    src_keys: &KeyPair,
    dst_file: &mut File,
    dst_keys: &KeyPair,
) -> Result<Entry> {
    src_file
        .seek(SeekFrom::Start(src_entry.data_offset))
        .map_err(|_| VaultError::Io("transfer: seek source failed".into()))?;

    let mut entry = src_entry.clone();
    entry.nonce = random_nonce();
    entry.data_offset = dst_file.stream_position()?;
    entry.size = src_entry.data_size;

    let mut src_cipher = Vec::new();
    let mut dst_cipher = Vec::new();

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut ks = vec![0u8; CHUNK_SIZE];

    let mut remaining = src_entry.data_size;
    let mut counter: u64 = 0;

    while remaining > 0 {
        let want = (remaining as usize).min(CHUNK_SIZE);
        src_file
            .read_exact(&mut buf[..want])
            .map_err(|_| VaultError::Io("transfer: read source object failed".into()))?;

        src_cipher.extend_from_slice(&buf[..want]);

        // Decrypt with the source keystream...
        keystream::generate(&src_keys.enc, &src_entry.nonce, counter, &mut ks[..want])?;
        for i in 0..want {
            buf[i] ^= ks[i];
        }

        // ...and immediately re-encrypt with the destination keystream.
        keystream::generate(&dst_keys.enc, &entry.nonce, counter, &mut ks[..want])?;
        for i in 0..want {
            buf[i] ^= ks[i];
        }

        dst_file
            .write_all(&buf[..want])
            .map_err(|_| VaultError::Io("transfer: write destination failed".into()))?;

        dst_cipher.extend_from_slice(&buf[..want]);

        remaining -= want as u64;
        counter += 1;
    }

    buf.zeroize();

    if !mac::verify(&src_keys.mac, &src_cipher, &src_entry.tag)? {
        return Err(VaultError::Integrity("integrity check failed".into()));
    }

    entry.data_size = src_entry.data_size;
    entry.tag = mac::compute(&dst_keys.mac, &dst_cipher)?;

    Ok(entry)
}

/// Re-key `src_vault` into `dst_vault`.
///
/// `select_paths` filters entries by the prefix rule (empty selects
/// everything); DELETED entries are always skipped, HIDDEN ones unless
/// `include_hidden`.
pub fn transfer_to_vault(
    src_vault: &Path,
    src_password: &str,
    dst_vault: &Path,
    dst_password: &str,
    select_paths: &[String],
    include_hidden: bool,
) -> Result<()> {
    let src = reader::open_for_view(src_vault, src_password)?;

    let salt = random_salt();
    let dst_header = GlobalHeader::new(
        salt,
        random_nonce(),
        DEFAULT_KEY_BITS as u32,
        DEFAULT_KDF_COST,
    );

    let dst_keys = kdf::derive(
        dst_password.as_bytes(),
        &salt,
        kdf::bits_to_bytes(DEFAULT_KEY_BITS),
        DEFAULT_KDF_COST,
    )?;

    let mut src_file = File::open(src_vault)
        .map_err(|_| VaultError::Io("transfer: cannot open source vault".into()))?;

    let mut dst_file = File::create(dst_vault)
        .map_err(|_| VaultError::Io("transfer: cannot create destination vault".into()))?;

    dst_file
        .write_all(&dst_header.encode())
        .map_err(|_| VaultError::Io("transfer: write header failed".into()))?;

    let mut dst_index = Index::default();

    for e in &src.index.entries {
        if e.is_deleted() {
            continue;
        }
        if e.is_hidden() && !include_hidden {
            continue;
        }
        if !select_paths.is_empty()
            && !select_paths.iter().any(|w| path_matches_prefix(w, &e.path))
        {
            continue;
        }

        if e.obj_type == ObjType::Dir {
            let mut d = e.clone();
            d.data_offset = 0;
            d.data_size = 0;
            d.nonce = [0u8; NONCE_SIZE];
            d.tag = [0u8; mac::TAG_SIZE];
            dst_index.entries.push(d);
            continue;
        }

        let entry = reencrypt_object(&mut src_file, e, &src.keys, &mut dst_file, &dst_keys)?;
        dst_index.entries.push(entry);
    }

    let index_offset = dst_file.stream_position()?;
    let idx_bytes = index::encode_index(&dst_index);
    dst_file
        .write_all(&idx_bytes)
        .map_err(|_| VaultError::Io("transfer: write index failed".into()))?;

    let idx_tag = mac::compute(&dst_keys.mac, &idx_bytes)?;
    let trailer = IndexTrailer::new(index_offset, idx_bytes.len() as u64, idx_tag);
    dst_file
        .write_all(&trailer.encode())
        .map_err(|_| VaultError::Io("transfer: write trailer failed".into()))?;

    dst_file.sync_all().ok();

    Ok(())
}
