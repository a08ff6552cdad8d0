//! Defines [`ContentDigest`] and [`RecordId`]. Both are hex-encoded SHA-256
//! hashes: a digest fingerprints a record's full field set so the registry can
//! tell whether a re-created record changed, and an identifier is derived from
//! a record kind plus a natural key so re-creating a record lands on the same
//! node.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// A deterministic fingerprint of a record's content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Fingerprints a serializable value. The value is first rendered as
    /// JSON; struct fields serialize in declaration order, so equal values
    /// always produce equal digests.
    pub fn of<T: Serialize>(value: &T) -> Result<ContentDigest, serde_json::Error> {
        Ok(ContentDigest::of_bytes(&serde_json::to_vec(value)?))
    }

    /// Fingerprints raw bytes (e.g., the contents of a source file).
    pub fn of_bytes(bytes: &[u8]) -> ContentDigest {
        ContentDigest(hex::encode(Sha256::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stable identifier for a node in the content registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Derives an identifier from a record kind (e.g., `Author`) and a key
    /// that is unique within that kind (e.g., the author's `author_id`).
    pub fn derive(kind: &str, key: &str) -> RecordId {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(32);
        RecordId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> RecordId {
        RecordId(s.to_owned())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        a: &'static str,
        b: u32,
    }

    #[test]
    fn test_digest_is_deterministic() -> Result<(), serde_json::Error> {
        let first = ContentDigest::of(&Sample { a: "x", b: 1 })?;
        let second = ContentDigest::of(&Sample { a: "x", b: 1 })?;
        assert_eq!(first, second);
        assert_eq!(64, first.as_str().len());
        Ok(())
    }

    #[test]
    fn test_digest_changes_with_any_field() -> Result<(), serde_json::Error> {
        let base = ContentDigest::of(&Sample { a: "x", b: 1 })?;
        assert_ne!(base, ContentDigest::of(&Sample { a: "y", b: 1 })?);
        assert_ne!(base, ContentDigest::of(&Sample { a: "x", b: 2 })?);
        Ok(())
    }

    #[test]
    fn test_record_id_depends_on_kind_and_key() {
        assert_eq!(
            RecordId::derive("Author", "joshj"),
            RecordId::derive("Author", "joshj")
        );
        assert_ne!(
            RecordId::derive("Author", "joshj"),
            RecordId::derive("Author", "kylem")
        );
        assert_ne!(
            RecordId::derive("Author", "joshj"),
            RecordId::derive("File", "joshj")
        );
        assert_eq!(32, RecordId::derive("Author", "joshj").as_str().len());
    }
}
