//! One module per subcommand.

pub mod add;
pub mod completions;
pub mod decrypt;
pub mod delete;
pub mod edit;
pub mod encrypt;
pub mod extract;
pub mod stealth;
pub mod transfer;
pub mod view;
