//! Integration tests for the vault container: create, open, extract,
//! mutate, and transfer.
//!
//! Most tests use small key sizes and a low KDF cost so the suite stays
//! fast; one test pins the default parameters end to end.

use std::fs;
use std::path::{Path, PathBuf};

use petoron_vault::errors::VaultError;
use petoron_vault::vault::index::{ObjType, F_DELETED, F_HIDDEN};
use petoron_vault::vault::reader::{extract_to_dir, open_for_view};
use petoron_vault::vault::transfer::transfer_to_vault;
use petoron_vault::vault::update::{
    add_paths_to_vault, delete_paths_in_vault, replace_file_in_vault, set_hidden_paths_in_vault,
};
use petoron_vault::vault::writer::create_vault_from_path;
use tempfile::TempDir;

const PW: &str = "1654test";
const FAST_BITS: usize = 256;
const FAST_COST: u32 = 2;

/// The fixture tree from the end-to-end scenarios:
/// `root/a.txt`, `root/b.txt`, `root/sub/c.txt`.
fn build_tree(base: &Path) -> PathBuf {
    let root = base.join("root");
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("a.txt"), "hello 1654\n").unwrap();
    fs::write(root.join("b.txt"), "second file\n").unwrap();
    fs::write(root.join("sub").join("c.txt"), "nested\n").unwrap();
    root
}

fn create_fast(base: &Path) -> PathBuf {
    let root = build_tree(base);
    create_vault_from_path(&root, None, PW, FAST_BITS, FAST_COST).unwrap()
}

// ---------------------------------------------------------------------------
// Create and extract round-trip
// ---------------------------------------------------------------------------

#[test]
fn create_and_extract_roundtrip() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let vo = open_for_view(&vault, PW).unwrap();
    let out = dir.path().join("restored");
    let extracted = extract_to_dir(&vo, &vault, &out, &[], false, true).unwrap();
    assert_eq!(extracted, 3);

    assert_eq!(fs::read(out.join("root/a.txt")).unwrap(), b"hello 1654\n");
    assert_eq!(fs::read(out.join("root/b.txt")).unwrap(), b"second file\n");
    assert_eq!(fs::read(out.join("root/sub/c.txt")).unwrap(), b"nested\n");
    assert!(out.join("root/sub").is_dir());
}

#[test]
fn default_parameters_land_in_header() {
    let dir = TempDir::new().unwrap();
    let root = build_tree(dir.path());
    let vault = create_vault_from_path(&root, None, PW, 1024, 50_000).unwrap();

    assert!(vault.to_string_lossy().ends_with(".1654"));

    let raw = fs::read(&vault).unwrap();
    assert_eq!(&raw[0..4], b"1654");
    assert_eq!(&raw[4..8], &1u32.to_le_bytes());
    assert_eq!(&raw[68..72], &1024u32.to_le_bytes());
    assert_eq!(&raw[72..76], &50_000u32.to_le_bytes());
    assert_eq!(&raw[raw.len() - 40..raw.len() - 36], b"IDX1");

    let vo = open_for_view(&vault, PW).unwrap();
    let paths: Vec<&str> = vo.index.entries.iter().map(|e| e.path.as_str()).collect();
    assert!(paths.contains(&"root/a.txt"));
    assert!(paths.contains(&"root/b.txt"));
    assert!(paths.contains(&"root/sub/c.txt"));
}

#[test]
fn single_file_input_uses_its_name() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("alone.bin");
    fs::write(&file, [0u8; 1000]).unwrap();

    let vault = create_vault_from_path(&file, None, PW, FAST_BITS, FAST_COST).unwrap();
    let vo = open_for_view(&vault, PW).unwrap();

    assert_eq!(vo.index.entries.len(), 1);
    assert_eq!(vo.index.entries[0].path, "alone.bin");
    assert_eq!(vo.index.entries[0].obj_type, ObjType::File);
    assert_eq!(vo.index.entries[0].size, 1000);
}

// ---------------------------------------------------------------------------
// Wrong password and tamper detection
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_fails_without_decrypting() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let err = open_for_view(&vault, "not-the-password").unwrap_err();
    assert!(matches!(err, VaultError::Integrity(_)));
    assert_eq!(err.to_string(), "wrong password or corrupted vault");
}

#[test]
fn ciphertext_tamper_detected_on_extract() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    // First object begins right after the fixed header.
    let mut raw = fs::read(&vault).unwrap();
    raw[100] ^= 0xff;
    fs::write(&vault, &raw).unwrap();

    // The index MAC still verifies; the object MAC must not.
    let vo = open_for_view(&vault, PW).unwrap();
    let err = extract_to_dir(&vo, &vault, &dir.path().join("out"), &[], false, true).unwrap_err();
    assert!(matches!(err, VaultError::Integrity(_)));
    assert_eq!(err.to_string(), "integrity check failed");
}

#[test]
fn index_tamper_detected_on_open() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let mut raw = fs::read(&vault).unwrap();
    let len = raw.len();
    let index_offset =
        u64::from_le_bytes(raw[len - 32..len - 24].try_into().unwrap()) as usize;
    raw[index_offset] ^= 0xff;
    fs::write(&vault, &raw).unwrap();

    let err = open_for_view(&vault, PW).unwrap_err();
    assert!(matches!(err, VaultError::Integrity(_)));
}

#[test]
fn trailer_tag_tamper_detected_on_open() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let mut raw = fs::read(&vault).unwrap();
    let len = raw.len();
    raw[len - 1] ^= 0x01;
    fs::write(&vault, &raw).unwrap();

    let err = open_for_view(&vault, PW).unwrap_err();
    assert!(matches!(err, VaultError::Integrity(_)));
    assert_eq!(err.to_string(), "wrong password or corrupted vault");
}

#[test]
fn truncation_detected_on_open() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let raw = fs::read(&vault).unwrap();
    fs::write(&vault, &raw[..raw.len() - 1]).unwrap();

    assert!(open_for_view(&vault, PW).is_err());
}

#[test]
fn open_nonexistent_vault_fails() {
    let dir = TempDir::new().unwrap();
    let err = open_for_view(&dir.path().join("missing.1654"), PW).unwrap_err();
    assert!(matches!(err, VaultError::Io(_)));
}

#[test]
fn zeroed_reserved_block_falls_back_to_legacy_params() {
    let dir = TempDir::new().unwrap();
    let root = build_tree(dir.path());
    // The legacy fallback is 512-bit keys at cost 1; write a vault with
    // exactly those params, then blank the reserved block.
    let vault = create_vault_from_path(&root, None, PW, 512, 1).unwrap();

    let mut raw = fs::read(&vault).unwrap();
    for b in &mut raw[68..76] {
        *b = 0;
    }
    fs::write(&vault, &raw).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    assert_eq!(vo.index.entries.len(), 5);
}

// ---------------------------------------------------------------------------
// Delete (logical) and stealth
// ---------------------------------------------------------------------------

#[test]
fn delete_is_logical_and_monotonic() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());
    let size_before = fs::metadata(&vault).unwrap().len();

    delete_paths_in_vault(&vault, PW, &["root/b.txt".to_string()]).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    let b = vo
        .index
        .entries
        .iter()
        .find(|e| e.path == "root/b.txt")
        .unwrap();
    assert!(b.flags & F_DELETED != 0);

    // Visible listing no longer contains it; the full listing still does.
    let visible: Vec<&str> = vo
        .index
        .entries
        .iter()
        .filter(|e| !e.is_deleted())
        .map(|e| e.path.as_str())
        .collect();
    assert!(!visible.contains(&"root/b.txt"));

    // Object bytes stay in place: the vault did not shrink.
    assert!(fs::metadata(&vault).unwrap().len() >= size_before);

    // The remaining files still decrypt.
    let out = dir.path().join("out");
    let extracted = extract_to_dir(&vo, &vault, &out, &[], false, true).unwrap();
    assert_eq!(extracted, 2);
    assert!(!out.join("root/b.txt").exists());
}

#[test]
fn delete_by_prefix_covers_subtree() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    delete_paths_in_vault(&vault, PW, &["root/sub".to_string()]).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    for path in ["root/sub", "root/sub/c.txt"] {
        let e = vo.index.entries.iter().find(|e| e.path == path).unwrap();
        assert!(e.is_deleted(), "{path} should be deleted");
    }
    assert!(!vo
        .index
        .entries
        .iter()
        .find(|e| e.path == "root/a.txt")
        .unwrap()
        .is_deleted());
}

#[test]
fn delete_without_match_is_an_error() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let err = delete_paths_in_vault(&vault, PW, &["no/such/path".to_string()]).unwrap_err();
    assert!(matches!(err, VaultError::Io(_)));
    assert_eq!(err.to_string(), "delete: no matching paths");
}

#[test]
fn stealth_sets_and_clears_hidden() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    set_hidden_paths_in_vault(&vault, PW, &["root/sub".to_string()], true).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    for path in ["root/sub", "root/sub/c.txt"] {
        let e = vo.index.entries.iter().find(|e| e.path == path).unwrap();
        assert!(e.flags & F_HIDDEN != 0, "{path} should be hidden");
    }

    // Hidden files are skipped unless requested.
    let out = dir.path().join("out");
    let extracted = extract_to_dir(&vo, &vault, &out, &[], false, true).unwrap();
    assert_eq!(extracted, 2);
    let out2 = dir.path().join("out2");
    let extracted = extract_to_dir(&vo, &vault, &out2, &[], true, true).unwrap();
    assert_eq!(extracted, 3);

    set_hidden_paths_in_vault(&vault, PW, &["root/sub".to_string()], false).unwrap();
    let vo = open_for_view(&vault, PW).unwrap();
    let e = vo
        .index
        .entries
        .iter()
        .find(|e| e.path == "root/sub/c.txt")
        .unwrap();
    assert!(e.flags & F_HIDDEN == 0);
}

#[test]
fn stealth_noop_is_an_error() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    // Clearing the flag when nothing is hidden changes nothing.
    let err =
        set_hidden_paths_in_vault(&vault, PW, &["root".to_string()], false).unwrap_err();
    assert!(matches!(err, VaultError::Io(_)));
}

// ---------------------------------------------------------------------------
// Edit (replace)
// ---------------------------------------------------------------------------

#[test]
fn edit_replaces_file_and_keeps_history() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let replacement = dir.path().join("replaced.txt");
    fs::write(&replacement, "replaced\n").unwrap();

    replace_file_in_vault(&vault, PW, "root/a.txt", &replacement).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    let versions: Vec<_> = vo
        .index
        .entries
        .iter()
        .filter(|e| e.path == "root/a.txt")
        .collect();
    assert_eq!(versions.len(), 2);
    assert!(versions[0].is_deleted());
    assert!(!versions[1].is_deleted());

    let out = dir.path().join("out");
    extract_to_dir(&vo, &vault, &out, &["root/a.txt".to_string()], false, false).unwrap();
    assert_eq!(fs::read(out.join("root/a.txt")).unwrap(), b"replaced\n");
}

#[test]
fn edit_missing_target_is_an_error() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let replacement = dir.path().join("replaced.txt");
    fs::write(&replacement, "replaced\n").unwrap();

    let err = replace_file_in_vault(&vault, PW, "root/zzz.txt", &replacement).unwrap_err();
    assert_eq!(err.to_string(), "edit: target path not found");
}

#[test]
fn edit_from_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let err = replace_file_in_vault(&vault, PW, "root/a.txt", dir.path()).unwrap_err();
    assert_eq!(err.to_string(), "edit: --from must be a regular file");
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn add_file_appends_object() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let extra = dir.path().join("extra.txt");
    fs::write(&extra, "appended\n").unwrap();

    add_paths_to_vault(&vault, PW, &[extra.clone()]).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    assert!(vo.index.contains_live("extra.txt"));

    let out = dir.path().join("out");
    extract_to_dir(&vo, &vault, &out, &["extra.txt".to_string()], false, false).unwrap();
    assert_eq!(fs::read(out.join("extra.txt")).unwrap(), b"appended\n");

    // Pre-existing objects survive the rewrite untouched.
    let out_all = dir.path().join("out_all");
    let extracted = extract_to_dir(&vo, &vault, &out_all, &[], false, true).unwrap();
    assert_eq!(extracted, 4);
    assert_eq!(fs::read(out_all.join("root/a.txt")).unwrap(), b"hello 1654\n");
}

#[test]
fn add_directory_appends_tree() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let tree = dir.path().join("more");
    fs::create_dir_all(tree.join("deep")).unwrap();
    fs::write(tree.join("x.txt"), "x\n").unwrap();
    fs::write(tree.join("deep").join("y.txt"), "y\n").unwrap();

    add_paths_to_vault(&vault, PW, &[tree]).unwrap();

    let vo = open_for_view(&vault, PW).unwrap();
    assert!(vo.index.has_dir("more"));
    assert!(vo.index.has_dir("more/deep"));
    assert!(vo.index.contains_live("more/x.txt"));
    assert!(vo.index.contains_live("more/deep/y.txt"));
}

#[test]
fn add_collision_is_an_error() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    let extra = dir.path().join("extra.txt");
    fs::write(&extra, "appended\n").unwrap();

    add_paths_to_vault(&vault, PW, &[extra.clone()]).unwrap();
    let err = add_paths_to_vault(&vault, PW, &[extra]).unwrap_err();
    assert!(matches!(err, VaultError::Io(_)));

    // The failed add must not have corrupted the vault.
    assert!(open_for_view(&vault, PW).is_ok());
}

#[test]
fn add_missing_input_leaves_vault_intact() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());
    let before = fs::read(&vault).unwrap();

    let err = add_paths_to_vault(&vault, PW, &[dir.path().join("nope")]).unwrap_err();
    assert!(matches!(err, VaultError::Io(_)));

    assert_eq!(fs::read(&vault).unwrap(), before);
    // No orphaned temp files either.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty());
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

#[test]
fn transfer_rekeys_with_fresh_randomness() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());
    let dst = dir.path().join("moved.1654");

    transfer_to_vault(&vault, PW, &dst, "new-password", &[], false).unwrap();

    let src_raw = fs::read(&vault).unwrap();
    let dst_raw = fs::read(&dst).unwrap();
    assert_eq!(&dst_raw[0..4], b"1654");
    // Fresh salt and header nonce.
    assert_ne!(&src_raw[12..44], &dst_raw[12..44]);
    assert_ne!(&src_raw[44..68], &dst_raw[44..68]);

    // Old password no longer opens the data; the new one does.
    assert!(open_for_view(&dst, PW).is_err());
    let vo = open_for_view(&dst, "new-password").unwrap();

    let out = dir.path().join("out");
    let extracted = extract_to_dir(&vo, &dst, &out, &[], false, true).unwrap();
    assert_eq!(extracted, 3);
    assert_eq!(fs::read(out.join("root/a.txt")).unwrap(), b"hello 1654\n");
    assert_eq!(fs::read(out.join("root/sub/c.txt")).unwrap(), b"nested\n");
}

#[test]
fn transfer_generates_new_object_nonces() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());
    let dst = dir.path().join("moved.1654");

    transfer_to_vault(&vault, PW, &dst, "new-password", &[], false).unwrap();

    let src = open_for_view(&vault, PW).unwrap();
    let dstv = open_for_view(&dst, "new-password").unwrap();

    for e in src.index.entries.iter().filter(|e| e.obj_type == ObjType::File) {
        let moved = dstv
            .index
            .entries
            .iter()
            .find(|d| d.path == e.path)
            .unwrap();
        assert_ne!(e.nonce, moved.nonce, "{} kept its nonce", e.path);
        assert_eq!(e.size, moved.size);
    }
}

#[test]
fn transfer_selection_and_hidden_rules() {
    let dir = TempDir::new().unwrap();
    let vault = create_fast(dir.path());

    set_hidden_paths_in_vault(&vault, PW, &["root/b.txt".to_string()], true).unwrap();
    delete_paths_in_vault(&vault, PW, &["root/a.txt".to_string()]).unwrap();

    // Deleted entries never transfer; hidden only with the flag.
    let dst = dir.path().join("default.1654");
    transfer_to_vault(&vault, PW, &dst, "pw2", &[], false).unwrap();
    let vo = open_for_view(&dst, "pw2").unwrap();
    let paths: Vec<&str> = vo.index.entries.iter().map(|e| e.path.as_str()).collect();
    assert!(!paths.contains(&"root/a.txt"));
    assert!(!paths.contains(&"root/b.txt"));
    assert!(paths.contains(&"root/sub/c.txt"));

    let dst_hidden = dir.path().join("hidden.1654");
    transfer_to_vault(&vault, PW, &dst_hidden, "pw2", &[], true).unwrap();
    let vo = open_for_view(&dst_hidden, "pw2").unwrap();
    let b = vo
        .index
        .entries
        .iter()
        .find(|e| e.path == "root/b.txt")
        .unwrap();
    assert!(b.is_hidden());

    // Path selection by prefix.
    let dst_sel = dir.path().join("selected.1654");
    transfer_to_vault(&vault, PW, &dst_sel, "pw2", &["root/sub".to_string()], false).unwrap();
    let vo = open_for_view(&dst_sel, "pw2").unwrap();
    let paths: Vec<&str> = vo.index.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["root/sub", "root/sub/c.txt"]);
}
