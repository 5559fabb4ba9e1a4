//! Configuration for the release controller.

use crate::error::{CliError, Result};

/// Default release branch prefix
pub const DEFAULT_BRANCH_PREFIX: &str = "release";

/// Configuration for release lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Prefix of release branch names (`<prefix>/<version>`)
    pub branch_prefix: String,
    /// Base branch to record for `new` instead of the checked-out branch
    pub base_override: Option<String>,
    /// Branch checked out again after finalizing
    pub trunk_branch: String,
    /// Remote whose copy of the trunk branch is checked out after finalizing
    pub remote: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            base_override: None,
            trunk_branch: "main".to_string(),
            remote: "origin".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Check the values can form valid ref names
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.branch_prefix;
        if prefix.is_empty() || prefix.starts_with('/') || prefix.ends_with('/') {
            return Err(CliError::InvalidArguments {
                reason: format!("invalid release branch prefix '{}'", prefix),
            }
            .into());
        }
        if self.trunk_branch.is_empty() || self.remote.is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "trunk branch and remote must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Remote-tracking revision of the trunk branch, e.g. `origin/main`
    pub fn remote_trunk(&self) -> String {
        format!("{}/{}", self.remote, self.trunk_branch)
    }

    /// Generate tag message for a final release
    pub fn generate_tag_message(&self, tag: &str) -> String {
        format!("Release {}", tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.remote_trunk(), "origin/main");
    }

    #[test]
    fn slash_delimited_prefix_is_rejected() {
        let config = ControllerConfig {
            branch_prefix: "release/".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
