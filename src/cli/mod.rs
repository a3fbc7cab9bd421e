//! CLI module for gatekeep
//!
//! Provides command-line interface for:
//! - serve: Load configuration and run the HTTP server
//! - issue-token: Sign a token with the configured secret

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{issue_token, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
