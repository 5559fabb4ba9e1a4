//! New command implementation.
//!
//! Cuts the release branch and records the release in progress.

use crate::cli::RuntimeConfig;
use crate::error::Result;

use super::open_controller;

/// Execute new command
pub(super) fn execute_new(
    version: &str,
    base: Option<&str>,
    config: &RuntimeConfig,
) -> Result<i32> {
    let controller = open_controller(config)?;
    let result = controller.new_release(version, base)?;
    let output = config.output();

    output.success(&format!(
        "Initialised release {} from {}",
        result.version, result.base
    ));
    output.detail(&format!("Branch: {}", result.branch));
    output.detail(&format!("Commit: {}", short(&result.commit)));
    match &result.previous {
        Some(previous) => output.detail(&format!("Previous release: {}", previous)),
        None => output.detail("Previous release: none"),
    }

    output.line("");
    output.info("Push the release branch to kick off the release process:");
    output.detail(&result.push_hint(&config.controller.remote));

    Ok(0)
}

fn short(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
