//! Canonical semantic version value type.

use super::{CANDIDATE_SUFFIX, VERSION_MARKER};
use crate::error::VersionError;
use semver::{BuildMetadata, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated semantic version in canonical `vMAJOR.MINOR.PATCH[-PRE]` form.
///
/// Build metadata is accepted on input but never kept, so two inputs that
/// differ only in build metadata compare equal and produce the same tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionSpec {
    inner: Version,
}

impl VersionSpec {
    /// Parse a version string, with or without the leading `v`.
    ///
    /// `v1` and `v1.2` are accepted as shorthand for `v1.0.0` and `v1.2.0`
    /// when no pre-release or build component follows.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix(VERSION_MARKER).unwrap_or(trimmed);

        let expanded = expand_shorthand(body);
        let mut inner = Version::parse(&expanded).map_err(|e| VersionError::InvalidVersion {
            version: input.to_string(),
            reason: e.to_string(),
        })?;
        inner.build = BuildMetadata::EMPTY;

        Ok(Self { inner })
    }

    /// Canonical form used for comparisons, tag names and persistence
    pub fn canonical(&self) -> String {
        format!("{}{}", VERSION_MARKER, self.inner)
    }

    /// Canonical form without the leading marker
    pub fn without_prefix(&self) -> String {
        self.inner.to_string()
    }

    /// Whether the version carries a pre-release component
    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// Tag name of the `number`th release candidate of this version
    pub fn candidate(&self, number: u32) -> String {
        format!("{}{}{}", self.canonical(), CANDIDATE_SUFFIX, number)
    }
}

fn expand_shorthand(body: &str) -> String {
    if body.contains(['-', '+']) {
        return body.to_string();
    }

    match body.matches('.').count() {
        0 => format!("{}.0.0", body),
        1 => format!("{}.0", body),
        _ => body.to_string(),
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", VERSION_MARKER, self.inner)
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionSpec {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionSpec> for String {
    fn from(value: VersionSpec) -> Self {
        value.canonical()
    }
}
