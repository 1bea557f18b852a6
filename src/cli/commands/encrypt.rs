//! `vault1654 encrypt` — create a vault from a file or folder.

use std::path::Path;

use crate::cli::{output, prompt_password};
use crate::errors::{Result, VaultError};
use crate::vault::writer::create_vault_from_path;

pub fn execute(path: &str, out: Option<&str>, bits: usize, cost: u32) -> Result<()> {
    if bits < 256 || bits % 8 != 0 {
        return Err(VaultError::Usage(
            "encrypt: --bits must be >= 256 and divisible by 8".into(),
        ));
    }
    if cost < 1 {
        return Err(VaultError::Usage("encrypt: --cost must be >= 1".into()));
    }

    let password = prompt_password("Password")?;

    let written = create_vault_from_path(
        Path::new(path),
        out.map(Path::new),
        &password,
        bits,
        cost,
    )?;

    output::success(&format!("Vault created at {}", written.display()));
    Ok(())
}
