//! CLI argument definitions using clap
//!
//! Commands:
//! - tidelog plan --config <path>
//! - tidelog explain --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tidelog - query planning over bucketized indexes of an append-only log
#[derive(Parser, Debug)]
#[command(name = "tidelog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan the filter expression read from stdin
    Plan {
        /// Path to configuration file
        #[arg(long, default_value = "./tidelog.json")]
        config: PathBuf,
    },

    /// Plan the filter expression read from stdin and describe the result
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./tidelog.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
