//! Precondition checks run before any release side effect.

use crate::error::{LifecycleError, Result};
use crate::state::BaseBranch;
use crate::version::VersionSpec;

/// Fail with `TagConflict` if any existing tag denotes the same tag as `wanted`.
///
/// Tags that parse as versions are compared by canonical form, so `1.4.0`,
/// `v1.4` and `v1.4.0+ci` all collide with `v1.4.0`.
pub(super) fn ensure_tag_absent(existing: &[String], wanted: &str) -> Result<()> {
    let wanted_version = VersionSpec::parse(wanted).ok();

    let conflict = existing.iter().find(|tag| {
        if tag.as_str() == wanted {
            return true;
        }
        match (&wanted_version, VersionSpec::parse(tag)) {
            (Some(wanted), Ok(found)) => *wanted == found,
            _ => false,
        }
    });

    match conflict {
        Some(tag) => Err(LifecycleError::TagConflict { tag: tag.clone() }.into()),
        None => Ok(()),
    }
}

/// Pick the base branch: the explicit one if given, else the checked-out one
pub(super) fn resolve_base(explicit: Option<&str>, current: Option<&str>) -> Result<BaseBranch> {
    let candidate = explicit.or(current).unwrap_or_default();
    candidate
        .parse::<BaseBranch>()
        .map_err(|branch| LifecycleError::InvalidBaseBranch { branch }.into())
}

/// Fail with `WrongBranch` unless `current` is `expected`
pub(super) fn ensure_on_branch(current: Option<&str>, expected: &str) -> Result<()> {
    if current == Some(expected) {
        return Ok(());
    }
    Err(LifecycleError::WrongBranch {
        expected: expected.to_string(),
        current: current.unwrap_or_default().to_string(),
    }
    .into())
}

/// Highest non-prerelease version tag below `version`, and whether any
/// release tag is at or above it
pub(super) fn previous_release(
    tags: &[String],
    version: &VersionSpec,
) -> (Option<VersionSpec>, bool) {
    let releases: Vec<VersionSpec> = tags
        .iter()
        .filter_map(|tag| VersionSpec::parse(tag).ok())
        .filter(|v| !v.is_prerelease())
        .collect();

    let previous = releases.iter().filter(|v| *v < version).max().cloned();
    let superseded = releases.iter().any(|v| v >= version);
    (previous, superseded)
}
