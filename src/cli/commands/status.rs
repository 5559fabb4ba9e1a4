//! Status command implementation.
//!
//! Displays the release in progress, if any.

use crate::cli::RuntimeConfig;
use crate::error::{ReleaseError, Result};

use super::open_controller;

/// Execute status command
pub(super) fn execute_status(json: bool, config: &RuntimeConfig) -> Result<i32> {
    let controller = open_controller(config)?;
    let output = config.output();

    let Some(report) = controller.status()? else {
        if json {
            println!("{}", serde_json::json!({ "status": "no_active_release" }));
        } else {
            output.line("No release in progress");
        }
        return Ok(0);
    };

    if json {
        let value = serde_json::json!({
            "status": "in_progress",
            "state": report.state,
            "branch": report.branch,
            "on_release_branch": report.on_release_branch,
            "next_candidate_tag": report.next_candidate_tag,
            "release_tag": report.release_tag,
            "state_file": report.state_path,
        });
        let json_output = serde_json::to_string_pretty(&value).map_err(ReleaseError::Json)?;
        println!("{}", json_output);
    } else {
        output.line(&format!("📊 {}", report.format_report()));
        if !report.on_release_branch {
            output.detail(&format!(
                "rc and finalize need the release branch: git checkout {}",
                report.branch
            ));
        }
    }

    Ok(0)
}
