//! `vault1654 view` — list vault contents, optionally filtered by glob.

use std::path::Path;

use crate::cli::{glob, output, prompt_password};
use crate::errors::Result;
use crate::vault::reader;

pub fn execute(vault: &str, search: Option<&str>, show_hidden: bool, show_all: bool) -> Result<()> {
    let password = prompt_password("Password")?;
    let vo = reader::open_for_view(Path::new(vault), &password)?;

    let pattern = search.unwrap_or("");

    let entries: Vec<_> = vo
        .index
        .entries
        .iter()
        .filter(|e| show_all || !e.is_deleted())
        .filter(|e| show_hidden || !e.is_hidden())
        .filter(|e| glob::matches(pattern, &e.path))
        .collect();

    output::print_entries_table(&entries);
    Ok(())
}
