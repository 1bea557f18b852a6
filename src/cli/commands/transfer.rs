//! `vault1654 transfer` — re-key a vault into a new one.

use std::path::Path;

use crate::cli::{output, prompt_password};
use crate::errors::Result;
use crate::vault::transfer;

pub fn execute(src: &str, dst: &str, paths: &[String], include_hidden: bool) -> Result<()> {
    let src_pass = prompt_password("Source password")?;
    let dst_pass = prompt_password("Destination password")?;

    transfer::transfer_to_vault(
        Path::new(src),
        &src_pass,
        Path::new(dst),
        &dst_pass,
        paths,
        include_hidden,
    )?;

    output::success(&format!("Transferred {src} -> {dst}"));
    Ok(())
}
