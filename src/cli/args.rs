//! CLI argument definitions using clap
//!
//! Commands:
//! - gatekeep serve [--config <path>] [--json-logs]
//! - gatekeep issue-token --subject <id> --role <role> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::Role;

/// gatekeep - authenticated, schema-validated product and user API
#[derive(Parser, Debug)]
#[command(name = "gatekeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (default: ./gatekeep.json when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit logs as JSON lines
        #[arg(long)]
        json_logs: bool,
    },

    /// Sign a token with the configured secret and print it
    IssueToken {
        /// User id placed in the token
        #[arg(long)]
        subject: i64,

        /// Role placed in the token (user or admin)
        #[arg(long)]
        role: Role,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
