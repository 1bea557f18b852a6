//! `vault1654 add` — append files or folders to an existing vault.

use std::path::{Path, PathBuf};

use crate::cli::{output, prompt_password};
use crate::errors::Result;
use crate::vault::update;

pub fn execute(vault: &str, paths: &[String]) -> Result<()> {
    let password = prompt_password("Password")?;

    let host_paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    update::add_paths_to_vault(Path::new(vault), &password, &host_paths)?;

    output::success(&format!("Added {} path(s)", paths.len()));
    Ok(())
}
