//! CLI module
//!
//! Command-line interface for poking at a wiki through the executor.
//!
//! # Commands
//!
//! - `check` - Log in (when configured) and show who we are
//! - `query` - Run one API request
//! - `list` - Page through a list query, optionally resuming from a state file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
