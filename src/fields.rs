//! The create-node hook. Every node the build creates is passed through
//! [`on_create_node`], which appends the derived fields later queries rely on:
//! a `slug` on every post, and an `authorId` on every image stored in an
//! `author` directory (the author's avatar).

use crate::digest::RecordId;
use crate::registry::{self, ContentRegistry, Field, Record};
use crate::slug::{self, derive_slug, source_file, SlugOptions};
use log::debug;
use std::fmt;

/// Images in a directory with this name are avatars; the file stem is the
/// `author_id` they belong to.
pub const AVATAR_DIRECTORY: &str = "author";

/// Attaches derived fields to the node `id`. Nodes of other kinds are left
/// untouched.
pub fn on_create_node<R: ContentRegistry>(
    registry: &mut R,
    id: &RecordId,
    options: &SlugOptions,
) -> Result<()> {
    let field = match registry.get_node(id).map(|node| &node.record) {
        None => return Err(Error::Registry(registry::Error::NotFound(id.clone()))),
        Some(Record::Post(_)) => Some(Field::Slug(derive_slug(&*registry, id, options)?)),
        Some(Record::Image(_)) => {
            let file = source_file(&*registry, id)?;
            match file.relative_directory == AVATAR_DIRECTORY {
                true => Some(Field::AuthorId(file.name.clone())),
                false => None,
            }
        }
        Some(_) => None,
    };

    if let Some(field) = field {
        debug!("node `{}`: attaching {:?}", id, field);
        registry.attach_field(id, field)?;
    }
    Ok(())
}

/// The result of the create-node hook.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to derive or attach a field.
#[derive(Debug)]
pub enum Error {
    /// Returned when the node's source file cannot be resolved.
    Slug(slug::Error),

    /// Returned when the registry rejects the field.
    Registry(registry::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Slug(err) => err.fmt(f),
            Error::Registry(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Slug(err) => Some(err),
            Error::Registry(err) => Some(err),
        }
    }
}

impl From<slug::Error> for Error {
    fn from(err: slug::Error) -> Error {
        Error::Slug(err)
    }
}

impl From<registry::Error> for Error {
    fn from(err: registry::Error) -> Error {
        Error::Registry(err)
    }
}
