//! Semantic version handling for release tags and branches.
//!
//! Every version that reaches a tag name, a branch name or the state file goes
//! through [`VersionSpec`], so equal versions always render identically.

mod spec;

pub use spec::VersionSpec;

/// Suffix placed between the release version and the candidate number
pub const CANDIDATE_SUFFIX: &str = "-pre";

/// Marker prepended to every canonical version
pub const VERSION_MARKER: char = 'v';
