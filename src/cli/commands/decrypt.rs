//! `vault1654 decrypt` — extract the whole vault, or re-key it with `--to`.

use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::{output, prompt_password};
use crate::errors::Result;
use crate::vault::{reader, transfer};

pub fn execute(
    vault: &str,
    out_dir: &str,
    to: Option<&str>,
    pass_out: Option<&str>,
    include_hidden: bool,
) -> Result<()> {
    let password = prompt_password("Password")?;

    if let Some(to_vault) = to {
        let pass_out = match pass_out {
            Some(p) => Zeroizing::new(p.to_string()),
            None => prompt_password("New password")?,
        };
        transfer::transfer_to_vault(
            Path::new(vault),
            &password,
            Path::new(to_vault),
            &pass_out,
            &[],
            include_hidden,
        )?;
        output::success(&format!("Transferred into {to_vault}"));
        return Ok(());
    }

    let vo = reader::open_for_view(Path::new(vault), &password)?;
    let extracted = reader::extract_to_dir(
        &vo,
        Path::new(vault),
        Path::new(out_dir),
        &[],
        include_hidden,
        true,
    )?;

    output::success(&format!("Extracted {extracted} file(s) to {out_dir}"));
    Ok(())
}
