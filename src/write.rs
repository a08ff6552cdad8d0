//! Writes the result of a build to disk as `manifest.json`: the site
//! metadata, every page request, every fragment declaration, and the avatar
//! file of each author that has one. A renderer consumes this file; nothing
//! here renders HTML.

use crate::page::{FragmentDeclaration, Manifest, PageRequest};
use crate::schema::SiteMetadata;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The name of the file written into the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Serialize)]
struct ManifestFile<'a> {
    site: &'a SiteMetadata,
    pages: &'a [PageRequest],
    slices: Vec<&'a FragmentDeclaration>,
    avatars: &'a BTreeMap<String, PathBuf>,
}

/// Writes `manifest` into `output_directory`, creating the directory if
/// needed, and returns the path of the written file.
pub fn write_manifest(
    output_directory: &Path,
    site: &SiteMetadata,
    manifest: &Manifest,
    avatars: &BTreeMap<String, PathBuf>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_directory)?;
    let path = output_directory.join(MANIFEST_FILE);
    let mut w = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(
        &mut w,
        &ManifestFile {
            site,
            pages: &manifest.pages,
            slices: manifest.slices.values().collect(),
            avatars,
        },
    )?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(path)
}

/// The result of a fallible manifest-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a manifest-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error serializing the manifest.
    Json(serde_json::Error),

    /// An error writing the output file.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`].
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Json(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::digest::RecordId;
    use crate::page::{Host, PageContext};

    #[test]
    fn test_write_manifest() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("public");

        let mut manifest = Manifest::new();
        manifest.create_slice(FragmentDeclaration {
            id: "header".to_owned(),
            component: PathBuf::from("header.js"),
            context: None,
        });
        manifest.create_page(PageRequest {
            path: "/hello/".to_owned(),
            component: PathBuf::from("blog-post.js"),
            context: PageContext {
                id: RecordId::from("a"),
                previous_post_id: None,
                next_post_id: None,
            },
            slices: vec![("bio".to_owned(), "bio--joshj".to_owned())]
                .into_iter()
                .collect(),
        });
        let mut avatars = BTreeMap::new();
        avatars.insert("joshj".to_owned(), PathBuf::from("author/joshj.png"));

        let path = write_manifest(&output, &SiteMetadata::default(), &manifest, &avatars)?;
        assert_eq!(output.join(MANIFEST_FILE), path);

        let written: serde_json::Value = serde_json::from_reader(File::open(&path)?)?;
        assert_eq!(
            serde_json::json!({
                "site": {"author": null, "site_url": null},
                "pages": [{
                    "path": "/hello/",
                    "component": "blog-post.js",
                    "context": {"id": "a", "previousPostId": null, "nextPostId": null},
                    "slices": {"bio": "bio--joshj"},
                }],
                "slices": [{"id": "header", "component": "header.js"}],
                "avatars": {"joshj": "author/joshj.png"},
            }),
            written
        );
        Ok(())
    }
}
