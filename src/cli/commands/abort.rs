//! Abort command implementation.
//!
//! Discards the release in progress. Exits with status 2 when either deletion
//! did not complete.

use crate::cli::RuntimeConfig;
use crate::error::Result;

use super::open_controller;

/// Exit code when the release was abandoned but something was left behind
const INCOMPLETE_ABORT_EXIT_CODE: i32 = 2;

/// Execute abort command
pub(super) fn execute_abort(config: &RuntimeConfig) -> Result<i32> {
    let controller = open_controller(config)?;
    let result = controller.abort()?;
    let output = config.output();

    if result.is_clean() {
        output.success(&format!(
            "Release {} aborted, branch {} removed",
            result.version, result.branch
        ));
        return Ok(0);
    }

    output.error(&format!("Release {} aborted with leftovers:", result.version));
    for failure in &result.cleanup_failures {
        output.diagnostic(&failure.to_string());
        output.diagnostic(&format!("  to fix: {}", failure.remedy()));
    }

    Ok(INCOMPLETE_ABORT_EXIT_CODE)
}
