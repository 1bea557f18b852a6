//! `vault1654 delete` — logically delete entries; their bytes stay in place.

use std::path::Path;

use crate::cli::{output, prompt_password};
use crate::errors::Result;
use crate::vault::update;

pub fn execute(vault: &str, paths: &[String]) -> Result<()> {
    let password = prompt_password("Password")?;

    update::delete_paths_in_vault(Path::new(vault), &password, paths)?;

    output::success(&format!("Deleted {} path(s)", paths.len()));
    Ok(())
}
