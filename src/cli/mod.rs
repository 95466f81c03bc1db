//! CLI module for tidelog
//!
//! Provides command-line interface for:
//! - plan: One-shot planning of a filter expression
//! - explain: One-shot planning with a human-readable description

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    explain, explain_response, plan, plan_response, run, run_command, Config, Store,
};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_error, write_response};
