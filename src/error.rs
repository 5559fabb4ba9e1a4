//! Comprehensive error types for releasectl operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use thiserror::Error;

/// Result type alias for releasectl operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all releasectl operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version parsing errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Release lifecycle guard violations
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    /// Git backend errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// State management errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Not a syntactically valid semantic version
    #[error("not a valid semantic version: '{version}': {reason}")]
    InvalidVersion {
        /// Version string as supplied
        version: String,
        /// Reason for the error
        reason: String,
    },
}

/// Guard violations raised by the release lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// A release state file already exists
    #[error("release {version} is already in progress; finalize or abort it first")]
    ReleaseAlreadyInProgress {
        /// Version of the release in progress
        version: String,
    },

    /// No release state file exists
    #[error("no release is in progress; use `releasectl new <version>` to start one")]
    NoActiveRelease,

    /// Release base branch outside the allowed set
    #[error("invalid base branch '{branch}': releases can be cut off either 'develop' or 'staging' only")]
    InvalidBaseBranch {
        /// Offending branch name (empty when HEAD is detached)
        branch: String,
    },

    /// Operator is not on the release branch
    #[error("currently on '{current}'; checkout the branch {expected} and run this command again")]
    WrongBranch {
        /// Branch the command requires
        expected: String,
        /// Branch currently checked out (empty when HEAD is detached)
        current: String,
    },

    /// Requested tag already exists
    #[error("the tag already exists: {tag}")]
    TagConflict {
        /// Tag name
        tag: String,
    },

    /// Release branch already exists
    #[error("the branch already exists: {branch}")]
    BranchConflict {
        /// Branch name
        branch: String,
    },
}

/// Git backend errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not a git repository
    #[error("couldn't find a valid repository: {reason}")]
    NotRepository {
        /// Reason for the error
        reason: String,
    },

    /// Repository has no work tree to keep the state file in
    #[error("repository at {path} has no work tree")]
    BareRepository {
        /// Path of the git directory
        path: std::path::PathBuf,
    },

    /// Reference lookup or resolution failed
    #[error("failed to resolve '{name}': {reason}")]
    ResolveFailed {
        /// Reference or revision name
        name: String,
        /// Reason for the error
        reason: String,
    },

    /// Branch operation failed
    #[error("git branch operation failed on '{branch}': {reason}")]
    BranchOperationFailed {
        /// Branch name
        branch: String,
        /// Reason for the error
        reason: String,
    },

    /// Tag creation or enumeration failed
    #[error("git tag operation failed on '{tag}': {reason}")]
    TagOperationFailed {
        /// Tag name
        tag: String,
        /// Reason for the error
        reason: String,
    },

    /// Checkout failed
    #[error("git checkout of '{branch}' failed: {reason}")]
    CheckoutFailed {
        /// Branch being checked out
        branch: String,
        /// Reason for the error
        reason: String,
    },
}

/// State management errors
#[derive(Error, Debug)]
pub enum StateError {
    /// State file corrupted
    #[error("State file corrupted: {reason}")]
    Corrupted {
        /// Reason for the error
        reason: String,
    },

    /// Failed to save state
    #[error("Failed to save state: {reason}")]
    SaveFailed {
        /// Reason for the error
        reason: String,
    },

    /// Failed to load state
    #[error("Failed to load state: {reason}")]
    LoadFailed {
        /// Reason for the error
        reason: String,
    },

    /// Failed to remove the state file
    #[error("couldn't remove the file {path}: {reason}")]
    RemoveFailed {
        /// State file path
        path: std::path::PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// The lock file could not be opened or locked
    #[error("couldn't lock {path}: {reason}")]
    LockFailed {
        /// Lock file path
        path: std::path::PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Another releasectl process holds the lock
    #[error("Timeout waiting for lock {path}; another release command is running")]
    LockTimeout {
        /// Lock file path
        path: std::path::PathBuf,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Lifecycle(LifecycleError::ReleaseAlreadyInProgress { version }) => vec![
                format!("Finish release {} with: releasectl finalize", version),
                "Or discard it with: releasectl abort".to_string(),
            ],
            ReleaseError::Lifecycle(LifecycleError::NoActiveRelease) => vec![
                "Start a release with: releasectl new <version>".to_string(),
            ],
            ReleaseError::Lifecycle(LifecycleError::WrongBranch { expected, .. }) => vec![
                format!("Switch to the release branch: git checkout {}", expected),
            ],
            ReleaseError::Lifecycle(LifecycleError::InvalidBaseBranch { .. }) => vec![
                "Checkout develop or staging: git checkout develop".to_string(),
                "Or name the base explicitly: releasectl new -b staging <version>".to_string(),
            ],
            ReleaseError::Lifecycle(LifecycleError::TagConflict { tag }) => vec![
                format!("Inspect the existing tag: git show {}", tag),
                "Choose a different version if the tag belongs to a previous release".to_string(),
            ],
            ReleaseError::Lifecycle(LifecycleError::BranchConflict { branch }) => vec![
                format!("Remove the stale branch if it is unused: git branch -D {}", branch),
            ],
            ReleaseError::State(StateError::LockTimeout { path }) => vec![
                "Wait for the other releasectl command to finish".to_string(),
                format!("If no other command is running, remove {}", path.display()),
            ],
            ReleaseError::State(StateError::Corrupted { .. }) => vec![
                "Inspect .release.json and fix or remove it by hand".to_string(),
            ],
            ReleaseError::Git(GitError::NotRepository { .. }) => vec![
                "Run releasectl from inside a git work tree, or pass -C <dir>".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
