//! # releasectl
//!
//! Release branch and tag management for git repositories.
//!
//! This crate drives the git side of a release process: cutting a release
//! branch off `develop` or `staging`, stamping release candidate tags,
//! tagging the final release and returning the work tree to the trunk branch.
//! The release in progress is persisted in a small JSON file next to the work
//! tree so each step can run as a separate command.
//!
//! ## Features
//!
//! - **Guarded Transitions**: Every command checks all of its preconditions
//!   before touching the repository
//! - **Two-Phase Finalize**: The release tag is never rolled back; cleanup
//!   problems are reported with the command that fixes them
//! - **Advisory Locking**: Concurrent invocations against one work tree wait
//!   for each other
//! - **Git Integration**: Reference and tag operations through gix
//!
//! ## Usage
//!
//! ```bash
//! releasectl new 1.4.0         # cut release/1.4.0
//! releasectl rc                # tag v1.4.0-pre1
//! releasectl finalize          # tag v1.4.0 and check out main
//! releasectl abort             # discard the release in progress
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod error;
pub mod git;
pub mod release;
pub mod state;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use error::{CliError, ReleaseError, Result};
pub use git::{GixRepository, MemoryRepository, RepositoryBackend};
pub use release::{ControllerConfig, ReleaseController};
pub use state::{BaseBranch, ReleaseState, StateStore};
pub use version::VersionSpec;
