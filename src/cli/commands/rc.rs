//! Rc command implementation.
//!
//! Stamps the next release candidate tag on the release branch.

use crate::cli::RuntimeConfig;
use crate::error::Result;

use super::open_controller;

/// Execute rc command
pub(super) fn execute_rc(config: &RuntimeConfig) -> Result<i32> {
    let controller = open_controller(config)?;
    let result = controller.tag_candidate()?;
    let output = config.output();

    output.success(&format!(
        "Release Candidate tag created: {} at {}",
        result.tag.name,
        result.tag.short_commit()
    ));
    output.detail(&format!(
        "{} candidate(s) for {} so far",
        result.num_candidates, result.version
    ));

    output.line("");
    output.info("Push the changes to update the remote and propagate the changes:");
    output.detail("git push --tags");

    Ok(0)
}
