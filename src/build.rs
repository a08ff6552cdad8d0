//! Exports the [`build_site`] function which stitches together the high-level
//! steps of a build: sourcing authors ([`crate::author`]) and content files
//! ([`crate::parser`]) into a registry, running the create-node hook
//! ([`crate::fields`]) over every new node, declaring fragments and linking
//! post pages ([`create_pages`]), and writing the manifest
//! ([`crate::write`]).

use crate::author::{self, source_authors, AUTHORS};
use crate::config::Config;
use crate::digest::RecordId;
use crate::fields::{self, on_create_node};
use crate::fragment::{dangling_bios, declare_author_fragments, declare_global_fragments};
use crate::link::{self, link_pages};
use crate::page::{Host, Manifest};
use crate::parser::{self, Parser};
use crate::registry::{self, ContentRegistry, MemoryRegistry};
use crate::write::{self, write_manifest};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// What a successful build produced.
#[derive(Debug, PartialEq)]
pub struct Summary {
    pub pages: usize,
    pub slices: usize,
    pub manifest: PathBuf,
}

/// Builds the site from a [`Config`] object. The manifest is only written
/// once every step has succeeded, so a failed build leaves no output behind.
pub fn build_site(config: &Config) -> Result<Summary> {
    let mut registry = MemoryRegistry::new();

    let mut created: Vec<RecordId> = source_authors(&mut registry, AUTHORS)?
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    created.extend(Parser::new(&config.sources).source_files(&mut registry)?);
    for id in &created {
        on_create_node(&mut registry, id, &config.slug_options)?;
    }
    info!("registry holds {} nodes", registry.len());

    let mut manifest = Manifest::new();
    create_pages(&registry, &mut manifest, config)?;

    let avatars: BTreeMap<String, PathBuf> = registry
        .author_avatars()
        .map_err(|err| Error::Query {
            what: "author avatars",
            err,
        })?
        .into_iter()
        .map(|(author_id, file)| (author_id, file.absolute_path))
        .collect();

    let path = write_manifest(&config.output_directory, &config.site, &manifest, &avatars)?;
    info!("wrote {}", path.display());
    Ok(Summary {
        pages: manifest.pages.len(),
        slices: manifest.slices.len(),
        manifest: path,
    })
}

/// Declares the global and per-author fragments and requests one page per
/// post. Authors and posts are queried fresh from `registry`. A failed query
/// aborts the pass before any page is handed to `host`.
pub fn create_pages<R, H>(registry: &R, host: &mut H, config: &Config) -> Result<()>
where
    R: ContentRegistry + ?Sized,
    H: Host,
{
    let mut declared: BTreeSet<String> =
        declare_global_fragments(host, &config.components.header, &config.components.footer)
            .into_iter()
            .collect();

    let authors = registry.authors().map_err(|err| Error::Query {
        what: "authors",
        err,
    })?;
    declared.extend(declare_author_fragments(host, &authors, &config.components.bio));

    let posts = registry
        .posts_by_date(config.post_limit)
        .map_err(|err| Error::Query {
            what: "blog posts",
            err,
        })?;
    let pages = link_pages(&posts, &config.components.blog_post)?;

    for (path, fragment) in dangling_bios(&pages, &declared) {
        if config.strict_authors {
            return Err(Error::DanglingAuthor {
                path: path.to_owned(),
                fragment: fragment.to_owned(),
            });
        }
        warn!("page `{}` uses undeclared fragment `{}`", path, fragment);
    }

    info!(
        "creating {} pages with {} author fragments",
        pages.len(),
        authors.len()
    );
    for page in pages {
        host.create_page(page);
    }
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from sourcing,
/// querying, linking, or writing the manifest.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors sourcing the author catalog.
    Author(author::Error),

    /// Returned for errors sourcing content files.
    Parse(parser::Error),

    /// Returned for errors deriving fields for new nodes.
    Fields(fields::Error),

    /// Returned when a registry query fails. `what` names the query.
    Query {
        what: &'static str,
        err: registry::Error,
    },

    /// Returned when posts cannot be turned into pages.
    Link(link::Error),

    /// Returned in strict mode when a page's bio names an unknown author.
    DanglingAuthor { path: String, fragment: String },

    /// Returned for errors writing the manifest.
    Write(write::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Author(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::Fields(err) => err.fmt(f),
            Error::Query { what, err } => {
                write!(f, "There was an error loading your {}: {}", what, err)
            }
            Error::Link(err) => err.fmt(f),
            Error::DanglingAuthor { path, fragment } => write!(
                f,
                "page `{}` uses fragment `{}` but no such author exists",
                path, fragment
            ),
            Error::Write(err) => write!(f, "Writing manifest: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Author(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Fields(err) => Some(err),
            Error::Query { what: _, err } => Some(err),
            Error::Link(err) => Some(err),
            Error::DanglingAuthor { .. } => None,
            Error::Write(err) => Some(err),
        }
    }
}

impl From<author::Error> for Error {
    /// Converts [`author::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: author::Error) -> Error {
        Error::Author(err)
    }
}

impl From<parser::Error> for Error {
    /// Converts [`parser::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: parser::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<fields::Error> for Error {
    /// Converts [`fields::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: fields::Error) -> Error {
        Error::Fields(err)
    }
}

impl From<link::Error> for Error {
    /// Converts [`link::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: link::Error) -> Error {
        Error::Link(err)
    }
}

impl From<write::Error> for Error {
    /// Converts [`write::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}
