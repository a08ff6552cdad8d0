//! The site's author catalog. Authors are configuration data: a fixed list
//! compiled into the binary and inserted into the registry at the start of
//! every build.

use crate::digest::{ContentDigest, RecordId};
use crate::registry::{self, ContentRegistry, Node, Record, Upsert};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The registry kind under which author ids are derived.
pub const AUTHOR_KIND: &str = "Author";

/// A static author entry in [`AUTHORS`].
#[derive(Clone, Copy, Debug)]
pub struct AuthorDefinition {
    pub name: &'static str,
    pub author_id: &'static str,
    pub summary: &'static str,
    pub twitter: &'static str,
}

/// The authors who write for this site.
pub const AUTHORS: &[AuthorDefinition] = &[
    AuthorDefinition {
        name: "Kyle Mathews",
        author_id: "kylem",
        summary: "who lives and works in San Francisco building useful things.",
        twitter: "kylemathews",
    },
    AuthorDefinition {
        name: "Josh Johnson",
        author_id: "joshj",
        summary: "who lives and works in Michigan building neat things.",
        twitter: "0xJ05H",
    },
];

/// An author as stored in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    pub name: String,
    pub author_id: String,
    pub summary: String,
    pub twitter: String,
}

impl From<&AuthorDefinition> for AuthorRecord {
    fn from(def: &AuthorDefinition) -> AuthorRecord {
        AuthorRecord {
            name: def.name.to_owned(),
            author_id: def.author_id.to_owned(),
            summary: def.summary.to_owned(),
            twitter: def.twitter.to_owned(),
        }
    }
}

impl AuthorRecord {
    /// The registry id for this author, derived from `author_id` alone.
    pub fn record_id(&self) -> RecordId {
        RecordId::derive(AUTHOR_KIND, &self.author_id)
    }

    /// Wraps the author in a registry [`Node`], fingerprinting every field.
    pub fn to_node(&self) -> Result<Node> {
        Ok(Node {
            id: self.record_id(),
            parent: None,
            digest: ContentDigest::of(self)?,
            record: Record::Author(self.clone()),
        })
    }
}

/// Inserts every author in `catalog` into `registry` and returns the ids and
/// outcomes in catalog order. Running this twice with the same catalog
/// reports [`Upsert::Unchanged`] for every author the second time.
pub fn source_authors<R: ContentRegistry>(
    registry: &mut R,
    catalog: &[AuthorDefinition],
) -> Result<Vec<(RecordId, Upsert)>> {
    let mut created = Vec::with_capacity(catalog.len());
    for def in catalog {
        let node = AuthorRecord::from(def).to_node()?;
        let id = node.id.clone();
        let upsert = registry.create_node(node)?;
        debug!("author `{}` ({}): {:?}", def.author_id, id, upsert);
        created.push((id, upsert));
    }
    Ok(created)
}

/// The result of a fallible author-sourcing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error sourcing authors.
#[derive(Debug)]
pub enum Error {
    /// Returned when an author cannot be fingerprinted.
    Digest(serde_json::Error),

    /// Returned when the registry rejects an author node.
    Registry(registry::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Digest(err) => write!(f, "fingerprinting author: {}", err),
            Error::Registry(err) => write!(f, "creating author node: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Digest(err) => Some(err),
            Error::Registry(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Digest(err)
    }
}

impl From<registry::Error> for Error {
    fn from(err: registry::Error) -> Error {
        Error::Registry(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::MemoryRegistry;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<&str> = AUTHORS.iter().map(|a| a.author_id).collect();
        assert_eq!(AUTHORS.len(), ids.len());
    }

    #[test]
    fn test_source_authors_is_idempotent() -> Result<()> {
        let mut registry = MemoryRegistry::new();
        let first = source_authors(&mut registry, AUTHORS)?;
        assert!(first.iter().all(|(_, upsert)| *upsert == Upsert::Created));

        let digests: Vec<ContentDigest> = registry.nodes().map(|n| n.digest.clone()).collect();
        let second = source_authors(&mut registry, AUTHORS)?;
        assert!(second.iter().all(|(_, upsert)| *upsert == Upsert::Unchanged));
        assert_eq!(
            digests,
            registry.nodes().map(|n| n.digest.clone()).collect::<Vec<_>>()
        );
        assert_eq!(AUTHORS.len(), registry.len());
        Ok(())
    }

    #[test]
    fn test_changed_field_updates_author() -> Result<()> {
        let mut registry = MemoryRegistry::new();
        source_authors(&mut registry, AUTHORS)?;

        let mut edited = AUTHORS.to_vec();
        edited[1].twitter = "joshj";
        let outcomes = source_authors(&mut registry, &edited)?;
        assert_eq!(Upsert::Unchanged, outcomes[0].1);
        assert_eq!(Upsert::Updated, outcomes[1].1);
        assert_eq!(AUTHORS.len(), registry.len());
        Ok(())
    }

    #[test]
    fn test_author_id_is_stable() {
        let josh = AuthorRecord::from(&AUTHORS[1]);
        assert_eq!(RecordId::derive("Author", "joshj"), josh.record_id());
    }
}
