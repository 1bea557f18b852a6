//! Vault container: format codec, index, and the four lifecycles
//! (create, open/extract, update, transfer).

pub mod format;
pub mod index;
pub mod reader;
pub mod transfer;
pub mod update;
pub mod writer;

pub use index::{Entry, Index, ObjType};
pub use reader::{open_for_view, VaultOpen};
pub use writer::create_vault_from_path;
