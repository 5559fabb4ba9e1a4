//! Result types for release lifecycle commands.

use crate::git::TagInfo;
use crate::state::{BaseBranch, ReleaseState};
use crate::version::VersionSpec;
use std::fmt;
use std::path::PathBuf;

/// Result of `new`
#[derive(Debug, Clone)]
pub struct NewReleaseResult {
    /// Version being released
    pub version: VersionSpec,
    /// Branch the release was cut from
    pub base: BaseBranch,
    /// Release branch that was created
    pub branch: String,
    /// Commit the release branch points at
    pub commit: String,
    /// Prior release found among the tags
    pub previous: Option<VersionSpec>,
}

impl NewReleaseResult {
    /// Command that publishes the release branch
    pub fn push_hint(&self, remote: &str) -> String {
        format!("git push -u {} {}", remote, self.branch)
    }
}

/// Result of `rc`
#[derive(Debug, Clone)]
pub struct CandidateResult {
    /// Version being released
    pub version: VersionSpec,
    /// Candidate tag that was created
    pub tag: TagInfo,
    /// Candidate count after this one
    pub num_candidates: u32,
}

/// Result of `finalize`
#[derive(Debug, Clone)]
pub struct FinalizeResult {
    /// Version that was released
    pub version: VersionSpec,
    /// Annotated release tag
    pub tag: TagInfo,
    /// Housekeeping steps that did not complete
    pub cleanup_failures: Vec<CleanupFailure>,
}

impl FinalizeResult {
    /// Whether every cleanup step completed
    pub fn is_clean(&self) -> bool {
        self.cleanup_failures.is_empty()
    }
}

/// Result of `abort`
#[derive(Debug, Clone)]
pub struct AbortResult {
    /// Version that was abandoned
    pub version: VersionSpec,
    /// Release branch that was (or should have been) deleted
    pub branch: String,
    /// Deletions that did not complete
    pub cleanup_failures: Vec<CleanupFailure>,
}

impl AbortResult {
    /// Whether both the branch and the state file are gone
    pub fn is_clean(&self) -> bool {
        self.cleanup_failures.is_empty()
    }
}

/// Snapshot of the release in progress
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Persisted state
    pub state: ReleaseState,
    /// Release branch name
    pub branch: String,
    /// Whether the release branch is checked out
    pub on_release_branch: bool,
    /// Tag the next `rc` would create
    pub next_candidate_tag: String,
    /// Tag `finalize` would create
    pub release_tag: String,
    /// Location of the state file
    pub state_path: PathBuf,
}

impl StatusReport {
    /// Format status for display
    pub fn format_report(&self) -> String {
        let checked_out = if self.on_release_branch {
            "checked out"
        } else {
            "not checked out"
        };
        format!(
            "{}\n\
             Branch: {} ({})\n\
             Next candidate: {}\n\
             Release tag: {}\n\
             State file: {}",
            self.state.summary(),
            self.branch,
            checked_out,
            self.next_candidate_tag,
            self.release_tag,
            self.state_path.display()
        )
    }
}

/// Best-effort housekeeping step of `finalize` or `abort`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStep {
    /// Check out the trunk branch at its remote-tracking revision
    CheckoutTrunk {
        /// Local trunk branch
        branch: String,
        /// Remote-tracking revision
        revision: String,
    },
    /// Delete the release branch
    DeleteBranch {
        /// Release branch
        branch: String,
    },
    /// Remove the state file
    RemoveState {
        /// State file path
        path: PathBuf,
    },
}

/// A housekeeping step that failed after the primary effect was committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    /// Step that failed
    pub step: CleanupStep,
    /// Why it failed
    pub reason: String,
}

impl CleanupFailure {
    /// Record a failed step
    pub fn new(step: CleanupStep, reason: impl fmt::Display) -> Self {
        Self {
            step,
            reason: reason.to_string(),
        }
    }

    /// Command that completes the step by hand
    pub fn remedy(&self) -> String {
        match &self.step {
            CleanupStep::CheckoutTrunk { branch, revision } => {
                format!("git checkout --force -B {} {}", branch, revision)
            }
            CleanupStep::DeleteBranch { branch } => format!("git branch -D {}", branch),
            CleanupStep::RemoveState { path } => format!("rm {}", path.display()),
        }
    }
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.step {
            CleanupStep::CheckoutTrunk { branch, revision } => write!(
                f,
                "couldn't check out {} at {}: {}",
                branch, revision, self.reason
            ),
            CleanupStep::DeleteBranch { branch } => {
                write!(f, "couldn't remove the branch {}: {}", branch, self.reason)
            }
            CleanupStep::RemoveState { path } => {
                write!(f, "couldn't remove the file {}: {}", path.display(), self.reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remedies_are_runnable_commands() {
        let failure = CleanupFailure::new(
            CleanupStep::DeleteBranch {
                branch: "release/1.0.0".to_string(),
            },
            "locked",
        );
        assert_eq!(failure.remedy(), "git branch -D release/1.0.0");
        assert_eq!(
            failure.to_string(),
            "couldn't remove the branch release/1.0.0: locked"
        );
    }
}
