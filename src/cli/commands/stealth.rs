//! `vault1654 stealth+` / `vault1654 stealth-` — hide or unhide entries.

use std::path::Path;

use crate::cli::{output, prompt_password};
use crate::errors::Result;
use crate::vault::update;

pub fn execute(vault: &str, paths: &[String], hidden: bool) -> Result<()> {
    let password = prompt_password("Password")?;

    update::set_hidden_paths_in_vault(Path::new(vault), &password, paths, hidden)?;

    if hidden {
        output::success(&format!("Hid {} path(s)", paths.len()));
    } else {
        output::success(&format!("Unhid {} path(s)", paths.len()));
    }
    Ok(())
}
