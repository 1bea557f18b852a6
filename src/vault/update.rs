//! In-place vault mutation via atomic rewrite.
//!
//! Every mutating operation follows one pattern: open and verify the
//! vault, clone its index, copy the byte prefix holding all existing
//! ciphertext into a sibling temp file, append any new objects, write
//! the new index and trailer, fsync, and rename over the original.
//! A crash at any point leaves the original vault intact.
//!
//! The work each operation contributes during the rewrite is expressed
//! as an [`UpdateOp`] value dispatched after the prefix copy and before
//! the index write.

use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::kdf::KeyPair;
use crate::crypto::{mac, object};
use crate::errors::{Result, VaultError};
use crate::vault::format::{IndexTrailer, GLOBAL_HEADER_SIZE};
use crate::vault::index::{self, path_matches_prefix, Entry, Index, ObjType, F_DELETED, F_HIDDEN};
use crate::vault::reader::{self, VaultOpen};
use crate::vault::writer::{random_nonce, vault_root_name};

/// A file waiting to be encrypted into the rewritten vault.  The entry
/// carries path, type, flags, and plaintext size; nonce, offset, data
/// size, and tag are filled at append time.
pub struct PendingFile {
    pub source: PathBuf,
    pub entry: Entry,
}

/// Extra work to perform inside the atomic rewrite.
pub enum UpdateOp {
    /// Index-only mutation; no bytes are appended.
    NoExtra,
    /// Append a single encrypted object.
    AppendFile(Box<PendingFile>),
    /// Append a batch of encrypted objects in order.
    AppendMany(Vec<PendingFile>),
}

fn append_file_object(
    output: &mut File,
    pending: PendingFile,
    keys: &KeyPair,
    new_index: &mut Index,
) -> Result<()> {
    let mut input = File::open(&pending.source)
        .map_err(|_| VaultError::Io("add: cannot open input file".into()))?;

    let mut entry = pending.entry;
    entry.nonce = random_nonce();
    entry.data_offset = output.stream_position()?;

    let (written, tag) =
        object::encrypt_stream(&mut input, output, &keys.enc, &keys.mac, &entry.nonce)?;
    entry.data_size = written;
    entry.tag = tag;

    new_index.entries.push(entry);
    Ok(())
}

fn temp_path_for(vault_path: &Path) -> PathBuf {
    let epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut os = vault_path.to_path_buf().into_os_string();
    os.push(format!(".tmp.{}.{}", std::process::id(), epoch_ms));
    PathBuf::from(os)
}

fn fsync_dir_best_effort(dir: Option<&Path>) {
    if let Some(dir) = dir {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}

fn copy_prefix_bytes(vault_path: &Path, dst: &mut File, nbytes: u64) -> Result<()> {
    let mut src =
        File::open(vault_path).map_err(|_| VaultError::Io("update: copy prefix failed".into()))?;
    let copied = io::copy(&mut std::io::Read::by_ref(&mut src).take(nbytes), dst)
        .map_err(|_| VaultError::Io("update: copy prefix failed".into()))?;
    if copied != nbytes {
        return Err(VaultError::Io("update: copy prefix failed".into()));
    }
    Ok(())
}

/// Rewrite `vault_path` with `new_index`, keeping every pre-existing
/// object byte-for-byte and appending whatever `op` contributes.
///
/// On any failure the original vault is untouched and the temp file is
/// removed (best effort).
fn atomic_rewrite(
    vault_path: &Path,
    vo: &VaultOpen,
    mut new_index: Index,
    op: UpdateOp,
) -> Result<()> {
    let prefix_len = vo.trailer.index_offset;
    if prefix_len < GLOBAL_HEADER_SIZE as u64 {
        return Err(VaultError::Integrity("update: bad old index_offset".into()));
    }

    let tmp = temp_path_for(vault_path);
    let old_perm = fs::metadata(vault_path).map(|m| m.permissions()).ok();

    let result = (|| -> Result<()> {
        let mut out = File::create(&tmp)
            .map_err(|_| VaultError::Io("update: cannot create temp vault".into()))?;

        copy_prefix_bytes(vault_path, &mut out, prefix_len)?;

        match op {
            UpdateOp::NoExtra => {}
            UpdateOp::AppendFile(pending) => {
                append_file_object(&mut out, *pending, &vo.keys, &mut new_index)?;
            }
            UpdateOp::AppendMany(batch) => {
                for pending in batch {
                    append_file_object(&mut out, pending, &vo.keys, &mut new_index)?;
                }
            }
        }

        let index_offset = out.stream_position()?;
        let idx_bytes = index::encode_index(&new_index);
        out.write_all(&idx_bytes)
            .map_err(|_| VaultError::Io("update: write index failed".into()))?;

        let idx_tag = mac::compute(&vo.keys.mac, &idx_bytes)?;
        let trailer = IndexTrailer::new(index_offset, idx_bytes.len() as u64, idx_tag);
        out.write_all(&trailer.encode())
            .map_err(|_| VaultError::Io("update: write trailer failed".into()))?;

        out.flush()
            .map_err(|_| VaultError::Io("update: flush temp failed".into()))?;

        if let Some(perm) = old_perm {
            let _ = fs::set_permissions(&tmp, perm);
        }

        let _ = out.sync_all();
        drop(out);
        fsync_dir_best_effort(tmp.parent());

        if fs::rename(&tmp, vault_path).is_err() {
            // Some platforms refuse to rename over an existing file.
            let _ = fs::remove_file(vault_path);
            fs::rename(&tmp, vault_path)
                .map_err(|_| VaultError::Io("update: rename temp->vault failed".into()))?;
        }

        fsync_dir_best_effort(vault_path.parent());
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Collect the pending files and directory entries for one host path
/// being added, enforcing the collision rules.
fn stage_add_path(path: &Path, new_index: &mut Index, out: &mut Vec<PendingFile>) -> Result<()> {
    if !path.exists() {
        return Err(VaultError::Io("add: input path not found".into()));
    }

    let meta = fs::metadata(path)?;
    if meta.is_dir() {
        let root = vault_root_name(path, "folder")?;
        if new_index.contains_live(&root) || staged(out, &root) {
            return Err(VaultError::Io("add: path collision in vault".into()));
        }
        new_index.push_dir(&root);
        stage_add_dir(path, &root, new_index, out)
    } else if meta.is_file() {
        let name = vault_root_name(path, "file")?;
        if new_index.contains_live(&name) || staged(out, &name) {
            return Err(VaultError::Io("add: file collision in vault".into()));
        }
        out.push(PendingFile {
            source: path.to_path_buf(),
            entry: Entry::new_file(name, meta.len()),
        });
        Ok(())
    } else {
        Err(VaultError::Io("add: unsupported path type".into()))
    }
}

/// Is `path` already claimed by a file staged earlier in this batch?
fn staged(pending: &[PendingFile], path: &str) -> bool {
    pending.iter().any(|p| p.entry.path == path)
}

fn stage_add_dir(
    dir: &Path,
    vault_prefix: &str,
    new_index: &mut Index,
    out: &mut Vec<PendingFile>,
) -> Result<()> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by_key(|c| c.file_name());

    for child in children {
        let name = child.file_name().to_string_lossy().into_owned();
        let in_vault = format!("{vault_prefix}/{name}");
        let file_type = child.file_type()?;

        if file_type.is_dir() {
            new_index.push_dir(&in_vault);
            stage_add_dir(&child.path(), &in_vault, new_index, out)?;
        } else if file_type.is_file() {
            if new_index.contains_live(&in_vault) || staged(out, &in_vault) {
                return Err(VaultError::Io("add: file collision in vault".into()));
            }
            new_index.ensure_parent_dirs(&in_vault);
            out.push(PendingFile {
                source: child.path(),
                entry: Entry::new_file(in_vault, child.metadata().map(|m| m.len()).unwrap_or(0)),
            });
        }
    }

    Ok(())
}

/// `add`: append host files/directories as new encrypted objects.
pub fn add_paths_to_vault(vault_path: &Path, password: &str, paths: &[PathBuf]) -> Result<()> {
    let vo = reader::open_for_view(vault_path, password)?;
    let mut new_index = vo.index.clone();

    let mut pending = Vec::new();
    for path in paths {
        stage_add_path(path, &mut new_index, &mut pending)?;
    }

    atomic_rewrite(vault_path, &vo, new_index, UpdateOp::AppendMany(pending))
}

/// `delete`: set the DELETED flag on every entry matching one of
/// `paths` by the prefix rule.  Object bytes stay in place.
pub fn delete_paths_in_vault(vault_path: &Path, password: &str, paths: &[String]) -> Result<()> {
    let vo = reader::open_for_view(vault_path, password)?;
    let mut new_index = vo.index.clone();

    let mut any = false;
    for e in &mut new_index.entries {
        if e.is_deleted() {
            continue;
        }
        if paths.iter().any(|p| path_matches_prefix(p, &e.path)) {
            e.flags |= F_DELETED;
            any = true;
        }
    }
    if !any {
        return Err(VaultError::Io("delete: no matching paths".into()));
    }

    atomic_rewrite(vault_path, &vo, new_index, UpdateOp::NoExtra)
}

/// `stealth+` / `stealth-`: set or clear the HIDDEN flag on matching
/// entries.  Deleted entries are left alone.
pub fn set_hidden_paths_in_vault(
    vault_path: &Path,
    password: &str,
    paths: &[String],
    hidden: bool,
) -> Result<()> {
    let vo = reader::open_for_view(vault_path, password)?;
    let mut new_index = vo.index.clone();

    let mut any = false;
    for e in &mut new_index.entries {
        if e.is_deleted() {
            continue;
        }
        if !paths.iter().any(|p| path_matches_prefix(p, &e.path)) {
            continue;
        }
        if hidden && !e.is_hidden() {
            e.flags |= F_HIDDEN;
            any = true;
        } else if !hidden && e.is_hidden() {
            e.flags &= !F_HIDDEN;
            any = true;
        }
    }
    if !any {
        return Err(VaultError::Io("stealth: no matching paths".into()));
    }

    atomic_rewrite(vault_path, &vo, new_index, UpdateOp::NoExtra)
}

/// `edit`: replace the File entry at exactly `target` with the contents
/// of `new_source`.  The old entry is flagged DELETED; the replacement
/// is appended with a fresh nonce.
pub fn replace_file_in_vault(
    vault_path: &Path,
    password: &str,
    target: &str,
    new_source: &Path,
) -> Result<()> {
    let vo = reader::open_for_view(vault_path, password)?;

    let source_meta = fs::metadata(new_source)
        .map_err(|_| VaultError::Io("edit: --from must be a regular file".into()))?;
    if !source_meta.is_file() {
        return Err(VaultError::Io("edit: --from must be a regular file".into()));
    }

    let mut new_index = vo.index.clone();

    let mut found = false;
    for e in &mut new_index.entries {
        if e.path == target && e.obj_type == ObjType::File && !e.is_deleted() {
            e.flags |= F_DELETED;
            found = true;
        }
    }
    if !found {
        return Err(VaultError::Io("edit: target path not found".into()));
    }

    new_index.ensure_parent_dirs(target);

    let pending = PendingFile {
        source: new_source.to_path_buf(),
        entry: Entry::new_file(target, source_meta.len()),
    };

    atomic_rewrite(
        vault_path,
        &vo,
        new_index,
        UpdateOp::AppendFile(Box::new(pending)),
    )
}
