//! Thin command shell over the ledger store.

pub mod core;
pub mod output;
pub mod selection;
pub mod shell;

pub use self::core::{CliError, CliMode, CommandError, ShellContext};
pub use shell::run_cli;
