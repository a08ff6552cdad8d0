//! Defines the [`ContentRegistry`] contract that the rest of the crate reads
//! from and appends to, the record kinds it stores, and [`MemoryRegistry`], a
//! process-local implementation. The registry is deliberately narrow: it
//! answers a handful of typed queries instead of a general query language.

use crate::author::AuthorRecord;
use crate::digest::{ContentDigest, RecordId};
use crate::schema::{Frontmatter, ImageFields, PostFields};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A content file discovered under one of the configured sources.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRecord {
    /// The name of the source the file was found under (e.g., `blog`).
    pub source_instance: String,

    pub absolute_path: PathBuf,

    /// The path relative to the source root, `/`-separated.
    pub relative_path: String,

    /// The directory part of `relative_path`; empty for top-level files.
    pub relative_directory: String,

    /// The file name without its extension.
    pub name: String,

    pub extension: String,
}

/// A markdown post. Its parent node is the [`FileRecord`] it was parsed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostRecord {
    pub frontmatter: Frontmatter,
    pub fields: PostFields,
    pub html: String,
}

/// An image. Its parent node is the [`FileRecord`] it was read from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageRecord {
    pub fields: ImageFields,
}

/// The typed payload of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Author(AuthorRecord),
    File(FileRecord),
    Post(PostRecord),
    Image(ImageRecord),
}

impl Record {
    /// The name of the record kind, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Author(_) => "Author",
            Record::File(_) => "File",
            Record::Post(_) => "Post",
            Record::Image(_) => "Image",
        }
    }
}

/// A record as stored in the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: RecordId,
    pub parent: Option<RecordId>,
    pub digest: ContentDigest,
    pub record: Record,
}

/// A derived field appended to an existing node.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// The URL path of a post.
    Slug(String),

    /// The author an image depicts.
    AuthorId(String),
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Field::Slug(_) => "slug",
            Field::AuthorId(_) => "authorId",
        }
    }
}

/// The outcome of [`ContentRegistry::create_node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    /// No node existed with this id.
    Created,

    /// A node existed with this id but a different digest; it was replaced.
    Updated,

    /// A node existed with this id and the same digest; it was kept as-is.
    Unchanged,
}

/// A post as returned by [`ContentRegistry::posts_by_date`].
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub id: RecordId,
    pub frontmatter: Frontmatter,
    pub fields: PostFields,
}

/// The store of typed records the build reads from and appends to.
pub trait ContentRegistry {
    /// Stores `node`. If a node with the same id and digest already exists the
    /// call is a no-op; a differing digest replaces the stored node.
    fn create_node(&mut self, node: Node) -> Result<Upsert>;

    /// Looks up a node by id.
    fn get_node(&self, id: &RecordId) -> Option<&Node>;

    /// Appends a derived field to an existing node.
    fn attach_field(&mut self, id: &RecordId, field: Field) -> Result<()>;

    /// Returns up to `limit` posts sorted ascending by frontmatter date.
    /// Undated posts sort after dated ones; ties keep creation order.
    fn posts_by_date(&self, limit: usize) -> Result<Vec<Post>>;

    /// Returns every author in the registry in creation order.
    fn authors(&self) -> Result<Vec<AuthorRecord>>;

    /// Returns `(author_id, file)` for every image tagged with an author.
    fn author_avatars(&self) -> Result<Vec<(String, FileRecord)>>;
}

/// An in-process [`ContentRegistry`]. Nodes are kept in creation order.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    nodes: Vec<Node>,
    index: BTreeMap<RecordId, usize>,
}

impl MemoryRegistry {
    pub fn new() -> MemoryRegistry {
        MemoryRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    fn get_node_mut(&mut self, id: &RecordId) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&i) => self.nodes.get_mut(i),
            None => None,
        }
    }
}

impl ContentRegistry for MemoryRegistry {
    fn create_node(&mut self, node: Node) -> Result<Upsert> {
        if let Some(parent) = &node.parent {
            if !self.index.contains_key(parent) {
                return Err(Error::MissingParent {
                    id: node.id,
                    parent: parent.clone(),
                });
            }
        }

        match self.index.get(&node.id) {
            Some(&i) if self.nodes[i].digest == node.digest => Ok(Upsert::Unchanged),
            Some(&i) => {
                self.nodes[i] = node;
                Ok(Upsert::Updated)
            }
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
                Ok(Upsert::Created)
            }
        }
    }

    fn get_node(&self, id: &RecordId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    fn attach_field(&mut self, id: &RecordId, field: Field) -> Result<()> {
        let node = self
            .get_node_mut(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        match (&mut node.record, field) {
            (Record::Post(post), Field::Slug(slug)) => post.fields.slug = Some(slug),
            (Record::Image(image), Field::AuthorId(author_id)) => {
                image.fields.author_id = Some(author_id)
            }
            (record, field) => {
                return Err(Error::FieldNotApplicable {
                    id: id.clone(),
                    kind: record.kind(),
                    field: field.name(),
                })
            }
        }
        Ok(())
    }

    fn posts_by_date(&self, limit: usize) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .nodes
            .iter()
            .filter_map(|node| match &node.record {
                Record::Post(post) => Some(Post {
                    id: node.id.clone(),
                    frontmatter: post.frontmatter.clone(),
                    fields: post.fields.clone(),
                }),
                _ => None,
            })
            .collect();

        // `sort_by` is stable, so equal dates keep creation order.
        posts.sort_by(|a, b| match (&a.frontmatter.date, &b.frontmatter.date) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        posts.truncate(limit);
        Ok(posts)
    }

    fn authors(&self) -> Result<Vec<AuthorRecord>> {
        Ok(self
            .nodes
            .iter()
            .filter_map(|node| match &node.record {
                Record::Author(author) => Some(author.clone()),
                _ => None,
            })
            .collect())
    }

    fn author_avatars(&self) -> Result<Vec<(String, FileRecord)>> {
        let mut avatars = Vec::new();
        for node in &self.nodes {
            if let Record::Image(ImageRecord {
                fields:
                    ImageFields {
                        author_id: Some(author_id),
                    },
            }) = &node.record
            {
                let parent = node
                    .parent
                    .as_ref()
                    .and_then(|parent| self.get_node(parent));
                if let Some(Node {
                    record: Record::File(file),
                    ..
                }) = parent
                {
                    avatars.push((author_id.clone(), file.clone()));
                }
            }
        }
        Ok(avatars)
    }
}

/// The result of a fallible registry operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reported by a [`ContentRegistry`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a node id is not present in the registry.
    NotFound(RecordId),

    /// Returned when a node names a parent that has not been created yet.
    MissingParent { id: RecordId, parent: RecordId },

    /// Returned when a field is attached to a record kind that has no such
    /// field (e.g., a slug on an author).
    FieldNotApplicable {
        id: RecordId,
        kind: &'static str,
        field: &'static str,
    },

    /// Returned when the backing store cannot answer a query.
    Unavailable(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(id) => write!(f, "no node with id `{}`", id),
            Error::MissingParent { id, parent } => {
                write!(f, "node `{}` names unknown parent `{}`", id, parent)
            }
            Error::FieldNotApplicable { id, kind, field } => write!(
                f,
                "cannot attach field `{}` to {} node `{}`",
                field, kind, id
            ),
            Error::Unavailable(reason) => write!(f, "registry unavailable: {}", reason),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::parse_date;

    fn post_node(key: &str, date: Option<&str>) -> Node {
        Node {
            id: RecordId::derive("Post", key),
            parent: None,
            digest: ContentDigest::of_bytes(key.as_bytes()),
            record: Record::Post(PostRecord {
                frontmatter: Frontmatter {
                    date: date.and_then(parse_date),
                    ..Frontmatter::default()
                },
                ..PostRecord::default()
            }),
        }
    }

    #[test]
    fn test_create_node_upsert_semantics() -> Result<()> {
        let mut registry = MemoryRegistry::new();
        assert_eq!(Upsert::Created, registry.create_node(post_node("a", None))?);
        assert_eq!(Upsert::Unchanged, registry.create_node(post_node("a", None))?);

        let mut changed = post_node("a", None);
        changed.digest = ContentDigest::of_bytes(b"changed");
        assert_eq!(Upsert::Updated, registry.create_node(changed)?);
        assert_eq!(1, registry.len());
        Ok(())
    }

    #[test]
    fn test_create_node_requires_parent() {
        let mut registry = MemoryRegistry::new();
        let mut orphan = post_node("a", None);
        orphan.parent = Some(RecordId::derive("File", "missing"));
        assert!(matches!(
            registry.create_node(orphan),
            Err(Error::MissingParent { .. })
        ));
    }

    #[test]
    fn test_posts_by_date_sorts_ascending() -> Result<()> {
        let mut registry = MemoryRegistry::new();
        registry.create_node(post_node("jan", Some("2020-01-01")))?;
        registry.create_node(post_node("jun", Some("2020-06-01")))?;
        registry.create_node(post_node("undated", None))?;
        registry.create_node(post_node("mar", Some("2020-03-01")))?;

        let ids: Vec<RecordId> = registry
            .posts_by_date(1000)?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let wanted: Vec<RecordId> = ["jan", "mar", "jun", "undated"]
            .iter()
            .map(|key| RecordId::derive("Post", key))
            .collect();
        assert_eq!(wanted, ids);
        Ok(())
    }

    #[test]
    fn test_posts_by_date_limit_and_empty() -> Result<()> {
        let mut registry = MemoryRegistry::new();
        assert!(registry.posts_by_date(1000)?.is_empty());

        registry.create_node(post_node("a", Some("2020-01-01")))?;
        registry.create_node(post_node("b", Some("2020-01-02")))?;
        assert_eq!(1, registry.posts_by_date(1)?.len());
        Ok(())
    }

    #[test]
    fn test_attach_field_checks_record_kind() -> Result<()> {
        let mut registry = MemoryRegistry::new();
        let node = post_node("a", None);
        let id = node.id.clone();
        registry.create_node(node)?;

        registry.attach_field(&id, Field::Slug("/a/".to_owned()))?;
        assert_eq!(
            Some("/a/".to_owned()),
            registry.posts_by_date(1)?[0].fields.slug
        );

        assert!(matches!(
            registry.attach_field(&id, Field::AuthorId("joshj".to_owned())),
            Err(Error::FieldNotApplicable { .. })
        ));
        assert!(matches!(
            registry.attach_field(&RecordId::from("nope"), Field::Slug(String::new())),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }
}
