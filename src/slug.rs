//! Derives the URL path ("slug") of a record from the location of the source
//! file it was created from.

use crate::digest::RecordId;
use crate::registry::{ContentRegistry, FileRecord, Record};
use std::fmt;

/// Controls the shape of derived slugs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlugOptions {
    /// Append `/` to every non-root slug.
    pub trailing_slash: bool,

    /// Pass each path component through `slug::slugify`.
    pub slugify: bool,
}

impl Default for SlugOptions {
    fn default() -> Self {
        SlugOptions {
            trailing_slash: true,
            slugify: false,
        }
    }
}

/// Derives the slug for the node `id`. The node's parent chain is followed
/// through `resolver` until a [`FileRecord`] is found; the slug is then
/// computed by [`file_path_slug`] from that file's source-relative path.
pub fn derive_slug<R: ContentRegistry + ?Sized>(
    resolver: &R,
    id: &RecordId,
    options: &SlugOptions,
) -> Result<String> {
    let file = source_file(resolver, id)?;
    Ok(file_path_slug(&file.relative_path, options))
}

/// Finds the nearest [`FileRecord`] at or above `id`.
pub fn source_file<'r, R: ContentRegistry + ?Sized>(
    resolver: &'r R,
    id: &RecordId,
) -> Result<&'r FileRecord> {
    let mut current = id.clone();
    loop {
        let node = resolver
            .get_node(&current)
            .ok_or_else(|| Error::NotFound(current.clone()))?;
        match (&node.record, &node.parent) {
            (Record::File(file), _) => return Ok(file),
            (_, Some(parent)) => current = parent.clone(),
            (_, None) => return Err(Error::NoSourceFile(id.clone())),
        }
    }
}

/// Maps a path relative to a content root onto a URL path.
///
/// The extension is dropped, a file named `index` maps onto its directory, and
/// the result always begins with `/`. For example `hello/index.md` becomes
/// `/hello/` and `2020/recap.md` becomes `/2020/recap/`.
pub fn file_path_slug(relative_path: &str, options: &SlugOptions) -> String {
    let path = relative_path.replace('\\', "/");
    let (dir, file_name) = match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path.as_str()),
    };
    let stem = match file_name.rfind('.') {
        Some(i) if i > 0 => &file_name[..i],
        _ => file_name,
    };
    let stem = if stem == "index" { "" } else { stem };

    let components: Vec<String> = dir
        .split('/')
        .chain(std::iter::once(stem))
        .filter(|c| !c.is_empty() && *c != ".")
        .map(|c| match options.slugify {
            true => ::slug::slugify(c),
            false => c.to_owned(),
        })
        .collect();

    let mut slug = String::from("/");
    slug.push_str(&components.join("/"));
    if options.trailing_slash && !components.is_empty() {
        slug.push('/');
    }
    slug
}

/// The result of a slug derivation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to resolve a record's source file.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when a node in the parent chain does not exist.
    NotFound(RecordId),

    /// Returned when the parent chain ends without reaching a file.
    NoSourceFile(RecordId),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(id) => write!(f, "no node with id `{}`", id),
            Error::NoSourceFile(id) => write!(f, "node `{}` has no source file", id),
        }
    }
}

impl std::error::Error for Error {}
