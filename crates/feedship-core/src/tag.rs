//! Revision → image tag derivation

use crate::error::{CoreError, Result};
use serde::Serialize;
use std::fmt;

/// Number of leading characters of the revision kept in the tag
pub const TAG_LENGTH: usize = 7;

/// Source-control revision resolved by the CI system for the current run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RevisionIdentifier(String);

impl RevisionIdentifier {
    pub fn new(revision: impl Into<String>) -> Self {
        Self(revision.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RevisionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RevisionIdentifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Label attached to a built image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageTag(String);

impl ImageTag {
    pub const LATEST: &'static str = "latest";

    /// The moving `latest` tag every build also receives
    pub fn latest() -> Self {
        Self(Self::LATEST.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the short image tag for a revision
///
/// Keeps the first [`TAG_LENGTH`] characters. A revision that is already
/// shorter is returned unchanged, matching `cut -c 1-7`.
///
/// # Examples
/// - `a1b2c3d4e5f6` -> `a1b2c3d`
/// - `ab` -> `ab`
pub fn resolve(revision: &RevisionIdentifier) -> Result<ImageTag> {
    if revision.is_empty() {
        return Err(CoreError::InvalidRevision);
    }

    let tag: String = revision.as_str().chars().take(TAG_LENGTH).collect();
    Ok(ImageTag(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_of(revision: &str) -> String {
        resolve(&RevisionIdentifier::new(revision))
            .unwrap()
            .as_str()
            .to_string()
    }

    #[test]
    fn test_resolve_full_sha() {
        assert_eq!(tag_of("a1b2c3d4e5f6"), "a1b2c3d");
        assert_eq!(
            tag_of("3f786850e387550fdab836ed7e6dc881de23001b"),
            "3f78685"
        );
    }

    #[test]
    fn test_resolve_short_revision_unchanged() {
        assert_eq!(tag_of("ab"), "ab");
        assert_eq!(tag_of("abcdef"), "abcdef");
    }

    #[test]
    fn test_resolve_exact_length() {
        assert_eq!(tag_of("deadbee"), "deadbee");
    }

    #[test]
    fn test_resolve_empty_is_invalid() {
        let err = resolve(&RevisionIdentifier::new("")).unwrap_err();
        assert_eq!(err, CoreError::InvalidRevision);
    }

    #[test]
    fn test_resolve_counts_characters_not_bytes() {
        assert_eq!(tag_of("äöüßéèêëx"), "äöüßéèê");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for revision in ["a1b2c3d4e5f6", "ab", "deadbeef", "1234567", "x"] {
            let once = tag_of(revision);
            let twice = tag_of(&once);
            assert_eq!(once, twice, "revision {revision}");
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let revision = RevisionIdentifier::new("0123456789abcdef");
        assert_eq!(resolve(&revision).unwrap(), resolve(&revision).unwrap());
    }

    #[test]
    fn test_latest_tag() {
        assert_eq!(ImageTag::latest().as_str(), "latest");
        assert_eq!(ImageTag::latest().to_string(), ImageTag::LATEST);
    }

    #[test]
    fn test_tag_serializes_as_plain_string() {
        let tag = resolve(&RevisionIdentifier::new("a1b2c3d4e5f6")).unwrap();
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"a1b2c3d\"");
    }
}
