//! `vault1654 edit` — replace one file entry with new contents.

use std::path::Path;

use crate::cli::{output, prompt_password};
use crate::errors::Result;
use crate::vault::update;

pub fn execute(vault: &str, target: &str, from: &str) -> Result<()> {
    let password = prompt_password("Password")?;

    update::replace_file_in_vault(Path::new(vault), &password, target, Path::new(from))?;

    output::success(&format!("Replaced {target}"));
    Ok(())
}
