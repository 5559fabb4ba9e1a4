//! Release state tracking and serialization.

use crate::error::{Result, StateError};
use crate::version::VersionSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Branch a release may be cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseBranch {
    /// The integration branch
    Develop,
    /// The pre-production branch
    Staging,
}

impl BaseBranch {
    /// All branches a release may be cut from
    pub const ALLOWED: [BaseBranch; 2] = [BaseBranch::Develop, BaseBranch::Staging];

    /// Branch name as it appears in the repository
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseBranch::Develop => "develop",
            BaseBranch::Staging => "staging",
        }
    }
}

impl fmt::Display for BaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseBranch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALLOWED
            .into_iter()
            .find(|base| base.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Persisted record of the release in progress.
///
/// The file holding this record existing is what makes a release "in
/// progress"; there is no other flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseState {
    /// Version being released
    pub version: VersionSpec,
    /// Branch the release was cut from
    pub base: BaseBranch,
    /// Highest release that preceded this one, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<VersionSpec>,
    /// Number of candidate tags stamped so far
    #[serde(rename = "num_prereleases", alias = "num_preleases")]
    pub num_candidates: u32,
}

impl ReleaseState {
    /// Create a fresh state with no candidates
    pub fn new(version: VersionSpec, base: BaseBranch) -> Self {
        Self {
            version,
            base,
            previous: None,
            num_candidates: 0,
        }
    }

    /// Attach the previous release version
    pub fn with_previous(mut self, previous: Option<VersionSpec>) -> Self {
        self.previous = previous;
        self
    }

    /// Release branch name for this state under `prefix`
    pub fn branch(&self, prefix: &str) -> String {
        release_branch_name(prefix, &self.version)
    }

    /// Tag name the next `rc` will create.
    ///
    /// Fails with [`StateError::Corrupted`] once the counter cannot advance.
    pub fn next_candidate_tag(&self) -> Result<String> {
        Ok(self.version.candidate(self.next_candidate_number()?))
    }

    /// Tag name `finalize` will create
    pub fn release_tag(&self) -> String {
        self.version.canonical()
    }

    /// Count one more stamped candidate and return the new count
    pub fn record_candidate(&mut self) -> Result<u32> {
        self.num_candidates = self.next_candidate_number()?;
        Ok(self.num_candidates)
    }

    fn next_candidate_number(&self) -> Result<u32> {
        self.num_candidates.checked_add(1).ok_or_else(|| {
            StateError::Corrupted {
                reason: format!(
                    "candidate counter of {} is exhausted at {}",
                    self.version, self.num_candidates
                ),
            }
            .into()
        })
    }

    /// One-line summary for display
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Release {} (cut from {}, {} candidate(s))",
            self.version, self.base, self.num_candidates
        );
        if let Some(previous) = &self.previous {
            summary.push_str(&format!(", previous release {}", previous));
        }
        summary
    }
}

/// Release branch name: `prefix/version-without-leading-v`
pub fn release_branch_name(prefix: &str, version: &VersionSpec) -> String {
    format!("{}/{}", prefix, version.without_prefix())
}
