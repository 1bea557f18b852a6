//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::index::{Entry, ObjType};

/// Print a green success message.
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message to stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a blue info message.
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a table of vault entries (Path, Size, Status).
///
/// Directory paths get a trailing slash; deleted entries are marked
/// `[deleted]`, hidden ones `[hidden]`.
pub fn print_entries_table(entries: &[&Entry]) {
    if entries.is_empty() {
        info("No matching entries.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Path", "Size", "Status"]);

    for e in entries {
        let path = if e.obj_type == ObjType::Dir {
            format!("{}/", e.path)
        } else {
            e.path.clone()
        };

        let size = if e.obj_type == ObjType::Dir {
            String::new()
        } else {
            e.size.to_string()
        };

        let status = if e.is_deleted() {
            "[deleted]"
        } else if e.is_hidden() {
            "[hidden]"
        } else {
            ""
        };

        table.add_row(vec![path, size, status.to_string()]);
    }

    println!("{table}");
}
