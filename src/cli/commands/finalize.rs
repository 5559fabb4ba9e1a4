//! Finalize command implementation.
//!
//! Tags the release and returns the work tree to the trunk branch. Cleanup
//! failures after the tag exists are warnings, not errors.

use crate::cli::RuntimeConfig;
use crate::error::Result;

use super::open_controller;

/// Execute finalize command
pub(super) fn execute_finalize(config: &RuntimeConfig) -> Result<i32> {
    let controller = open_controller(config)?;
    let result = controller.finalize()?;
    let output = config.output();

    output.success(&format!(
        "Release tag {} created at {}",
        result.tag.name,
        result.tag.short_commit()
    ));

    if result.is_clean() {
        output.detail(&format!(
            "Checked out {} at {}",
            config.controller.trunk_branch,
            config.controller.remote_trunk()
        ));
    } else {
        output.warn(&format!(
            "Release {} is tagged but cleanup did not complete:",
            result.version
        ));
        for failure in &result.cleanup_failures {
            output.diagnostic(&failure.to_string());
            output.diagnostic(&format!("  to fix: {}", failure.remedy()));
        }
    }

    output.line("");
    output.info("Push the release tag to publish the release:");
    output.detail(&format!(
        "git push {} {}",
        config.controller.remote, result.tag.name
    ));

    Ok(0)
}
