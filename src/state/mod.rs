//! State management for the release in progress.
//!
//! This module provides the persisted release record and the store that
//! reads, writes and locks it.

mod release_state;
mod store;

pub use release_state::{BaseBranch, ReleaseState, release_branch_name};
pub use store::{DEFAULT_LOCK_TIMEOUT, LOCK_FILE_NAME, STATE_FILE_NAME, StateLock, StateStore};

