//! Version-control backends for release workflows.
//!
//! This module provides the RepositoryBackend capability trait together with
//! a gix-based implementation for real repositories and an in-memory one for
//! tests and dry experimentation.

mod gix_backend;
mod memory;
mod operations;

pub use gix_backend::GixRepository;
pub use memory::{MemoryOp, MemoryRepository};
pub use operations::{RepositoryBackend, TagInfo};
