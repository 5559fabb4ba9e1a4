//! Repository capability trait and types for release management.
//!
//! This module defines the RepositoryBackend trait listing every primitive the
//! release lifecycle needs from version control. The real implementation lives
//! in the gix_backend module; the memory module provides an in-process double.

use crate::error::Result;

/// Primitives the release lifecycle needs from version control.
///
/// All calls are blocking and run in program order. Commit identifiers are
/// full hex object ids.
pub trait RepositoryBackend {
    /// Short name of the checked-out branch, `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// Commit HEAD points at
    fn head_commit(&self) -> Result<String>;

    /// Short names of every tag in the repository
    fn tag_names(&self) -> Result<Vec<String>>;

    /// Check if a local branch exists
    fn branch_exists(&self, branch_name: &str) -> Result<bool>;

    /// Create a local branch at `target` without checking it out
    fn create_branch(&self, branch_name: &str, target: &str) -> Result<()>;

    /// Delete a local branch
    fn delete_branch(&self, branch_name: &str) -> Result<()>;

    /// Create a lightweight tag at `target`
    fn create_lightweight_tag(&self, tag_name: &str, target: &str) -> Result<TagInfo>;

    /// Create an annotated tag at `target`
    fn create_annotated_tag(&self, tag_name: &str, target: &str, message: &str)
    -> Result<TagInfo>;

    /// Resolve a revision such as `origin/main` to a commit
    fn resolve_revision(&self, revision: &str) -> Result<String>;

    /// Point `branch_name` at `target`, creating it if needed, and check it out
    /// discarding local modifications
    fn checkout_force_create(&self, branch_name: &str, target: &str) -> Result<()>;

    /// Check if tag exists
    fn tag_exists(&self, tag_name: &str) -> Result<bool> {
        Ok(self.tag_names()?.iter().any(|name| name == tag_name))
    }
}

/// Information about a Git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Tag message (if annotated)
    pub message: Option<String>,
    /// Target commit hash
    pub target_commit: String,
    /// Whether this is an annotated tag
    pub is_annotated: bool,
}

impl TagInfo {
    /// Short form of the target commit
    pub fn short_commit(&self) -> &str {
        let end = self.target_commit.len().min(7);
        &self.target_commit[..end]
    }
}
