//! CLI module — Clap argument parser, output helpers, and command
//! implementations.

pub mod commands;
pub mod glob;
pub mod output;

use clap::Parser;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// vault1654: single-file encrypted archive tool.
#[derive(Parser)]
#[command(
    name = "vault1654",
    about = "Single-file encrypted archive tool",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a vault from a file or folder
    Encrypt {
        /// Input file or directory
        path: String,
        /// Output vault path (default: <input>.1654)
        #[arg(long)]
        out: Option<String>,
        /// Key size in bits (>= 256, multiple of 8)
        #[arg(long, default_value_t = 1024)]
        bits: usize,
        /// KDF iteration count (>= 1)
        #[arg(long, default_value_t = 50_000)]
        cost: u32,
    },

    /// Extract the whole vault to the filesystem (or re-key with --to)
    Decrypt {
        /// Vault file
        vault: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: String,
        /// Transfer into a new vault instead of extracting
        #[arg(long)]
        to: Option<String>,
        /// Password for the new vault (prompted if omitted)
        #[arg(long)]
        pass_out: Option<String>,
        /// Include hidden entries
        #[arg(long)]
        hidden: bool,
    },

    /// List vault contents
    View {
        /// Vault file
        vault: String,
        /// Glob pattern filter (supports * and ?)
        #[arg(long)]
        search: Option<String>,
        /// Show hidden entries
        #[arg(long)]
        hidden: bool,
        /// Show deleted entries too
        #[arg(long)]
        all: bool,
    },

    /// Extract selected paths (prefix match)
    Extract {
        /// Vault file
        vault: String,
        /// In-vault paths to extract
        #[arg(required = true)]
        paths: Vec<String>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: String,
        /// Transfer the selection into a new vault instead
        #[arg(long)]
        to: Option<String>,
        /// Password for the new vault (prompted if omitted)
        #[arg(long)]
        pass_out: Option<String>,
        /// Include hidden entries
        #[arg(long)]
        hidden: bool,
    },

    /// Append files or folders to an existing vault
    Add {
        /// Vault file
        vault: String,
        /// Host paths to add
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Logically delete entries (bytes stay, flag is set)
    Delete {
        /// Vault file
        vault: String,
        /// In-vault paths to delete (prefix match)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Replace one file entry with new contents
    Edit {
        /// Vault file
        vault: String,
        /// In-vault path of the file to replace
        target: String,
        /// Host file providing the new contents
        #[arg(long)]
        from: String,
    },

    /// Hide entries from normal listings
    #[command(name = "stealth+")]
    StealthSet {
        /// Vault file
        vault: String,
        /// In-vault paths to hide (prefix match)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Unhide entries
    #[command(name = "stealth-")]
    StealthClear {
        /// Vault file
        vault: String,
        /// In-vault paths to unhide (prefix match)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Re-key a vault into a new one under a new password
    Transfer {
        /// Source vault
        src: String,
        /// Destination vault
        dst: String,
        /// Optional in-vault paths to carry over (prefix match)
        paths: Vec<String>,
        /// Include hidden entries
        #[arg(long)]
        hidden: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Prompt for a password on the interactive terminal.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on
/// drop.  A non-interactive stdin is a usage error: passwords are never
/// read from pipes.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    use std::io::IsTerminal;
    if !std::io::stdin().is_terminal() {
        return Err(VaultError::Usage(
            "password input requires a TTY (interactive terminal)".into(),
        ));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::Usage(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
