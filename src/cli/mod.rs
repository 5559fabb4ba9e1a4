//! Command line interface for releasectl.
//!
//! This module provides argument parsing, command execution and colored user
//! feedback on top of the release controller.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::{FAILURE_EXIT_CODE, execute_command};
pub use output::OutputManager;

/// Main CLI entry point, returning the process exit code
pub fn run() -> i32 {
    let args = Args::parse_args();
    execute_command(args)
}
