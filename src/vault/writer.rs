//! Creating a new vault from a host file or directory tree.

use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};

use rand::RngCore;

use crate::crypto::kdf::{self, KeyPair};
use crate::crypto::{mac, object};
use crate::errors::{Result, VaultError};
use crate::vault::format::{
    GlobalHeader, IndexTrailer, NONCE_SIZE, SALT_SIZE, VAULT_EXTENSION,
};
use crate::vault::index::{self, Entry, Index};

/// Fresh KDF salt from OS entropy.
pub fn random_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Fresh object/header nonce from OS entropy.
pub fn random_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

/// The in-vault name for an input path: its final component, or
/// `fallback` when the path has none (e.g. a filesystem root).  Inputs
/// that resolve through `.` or `..` are rejected.
pub(crate) fn vault_root_name(path: &Path, fallback: &str) -> Result<String> {
    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => {
            let relative = path
                .components()
                .any(|c| matches!(c, Component::CurDir | Component::ParentDir));
            if relative {
                Err(VaultError::Io(
                    "input path must name a file or directory".into(),
                ))
            } else {
                Ok(fallback.to_string())
            }
        }
    }
}

fn default_out_name(input: &Path) -> PathBuf {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vault".to_string());
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{base}.{VAULT_EXTENSION}"))
}

/// Append the vault extension unless the path already carries it.
fn enforce_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some_and(|e| e == VAULT_EXTENSION) {
        path
    } else {
        let mut os = path.into_os_string();
        os.push(".");
        os.push(VAULT_EXTENSION);
        PathBuf::from(os)
    }
}

/// Encrypt one host file into the output stream and push its entry.
pub(crate) fn write_one_file(
    output: &mut File,
    file_path: &Path,
    in_vault_path: &str,
    keys: &KeyPair,
    idx: &mut Index,
) -> Result<()> {
    let mut input = File::open(file_path)
        .map_err(|_| VaultError::Io("encrypt: cannot open input file".into()))?;

    let mut entry = Entry::new_file(
        in_vault_path,
        fs::metadata(file_path).map(|m| m.len()).unwrap_or(0),
    );

    idx.ensure_parent_dirs(&entry.path);

    entry.nonce = random_nonce();
    entry.data_offset = output.stream_position()?;

    let (written, tag) =
        object::encrypt_stream(&mut input, output, &keys.enc, &keys.mac, &entry.nonce)?;
    entry.data_size = written;
    entry.tag = tag;

    idx.entries.push(entry);
    Ok(())
}

/// Depth-first walk over `dir`, children in name order for deterministic
/// output.  Directories become Dir entries, regular files become
/// encrypted objects; anything else is skipped.
fn walk_dir(
    output: &mut File,
    dir: &Path,
    vault_prefix: &str,
    keys: &KeyPair,
    idx: &mut Index,
) -> Result<()> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by_key(|c| c.file_name());

    for child in children {
        let name = child.file_name().to_string_lossy().into_owned();
        let in_vault = format!("{vault_prefix}/{name}");
        let file_type = child.file_type()?;

        if file_type.is_dir() {
            idx.push_dir(&in_vault);
            walk_dir(output, &child.path(), &in_vault, keys, idx)?;
        } else if file_type.is_file() {
            write_one_file(output, &child.path(), &in_vault, keys, idx)?;
        }
    }

    Ok(())
}

/// Build a vault at `out_path` (or a derived default) from `input_path`.
///
/// Returns the path actually written, with the vault extension enforced.
pub fn create_vault_from_path(
    input_path: &Path,
    out_path: Option<&Path>,
    password: &str,
    key_bits: usize,
    kdf_cost: u32,
) -> Result<PathBuf> {
    if !input_path.exists() {
        return Err(VaultError::Io("encrypt: input path not found".into()));
    }

    let out = enforce_extension(
        out_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_out_name(input_path)),
    );

    let salt = random_salt();
    let header = GlobalHeader::new(salt, random_nonce(), key_bits as u32, kdf_cost);

    let keys = kdf::derive(
        password.as_bytes(),
        &salt,
        kdf::bits_to_bytes(key_bits),
        kdf_cost,
    )?;

    let mut output = File::create(&out)
        .map_err(|_| VaultError::Io("encrypt: cannot create vault output file".into()))?;

    output
        .write_all(&header.encode())
        .map_err(|_| VaultError::Io("encrypt: write header failed".into()))?;

    let mut idx = Index::default();

    let meta = fs::metadata(input_path)?;
    if meta.is_file() {
        let name = vault_root_name(input_path, "file")?;
        write_one_file(&mut output, input_path, &name, &keys, &mut idx)?;
    } else if meta.is_dir() {
        let root = vault_root_name(input_path, "folder")?;
        idx.push_dir(&root);
        walk_dir(&mut output, input_path, &root, &keys, &mut idx)?;
    } else {
        return Err(VaultError::Io("encrypt: unsupported input type".into()));
    }

    let index_offset = output.stream_position()?;
    let idx_bytes = index::encode_index(&idx);
    output
        .write_all(&idx_bytes)
        .map_err(|_| VaultError::Io("encrypt: write index failed".into()))?;

    let idx_tag = mac::compute(&keys.mac, &idx_bytes)?;
    let trailer = IndexTrailer::new(index_offset, idx_bytes.len() as u64, idx_tag);
    output
        .write_all(&trailer.encode())
        .map_err(|_| VaultError::Io("encrypt: write trailer failed".into()))?;

    output.sync_all().ok();

    Ok(out)
}
