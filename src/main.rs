//! releasectl - release branch and tag management for git repositories.
//!
//! This binary wraps the release controller with argument parsing, colored
//! output and exit codes.

use releasectl::cli;
use std::process;

fn main() {
    env_logger::init();
    process::exit(cli::run());
}
