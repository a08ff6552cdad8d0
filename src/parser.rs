//! Defines the [`Parser`] type, which walks the configured content sources and
//! creates registry nodes for what it finds: a file node for every file, plus
//! a post node for markdown files and an image node for image files. Post
//! frontmatter is parsed with [`serde_yaml`] and the body is rendered to HTML
//! with [`pulldown_cmark`].

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use pulldown_cmark::{html, Options, Parser as MarkdownParser};
use walkdir::WalkDir;

use crate::config::Source;
use crate::digest::{ContentDigest, RecordId};
use crate::registry::{self, ContentRegistry, FileRecord, ImageRecord, Node, PostRecord, Record};
use crate::schema::Frontmatter;

const MARKDOWN_EXTENSION: &str = "md";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "avif"];

/// Creates registry nodes from the files under a set of [`Source`]s.
pub struct Parser<'a> {
    sources: &'a [Source],
}

impl<'a> Parser<'a> {
    pub fn new(sources: &'a [Source]) -> Parser<'a> {
        Parser { sources }
    }

    /// Walks every source and creates its nodes in `registry`. Returns the id
    /// of every node created, parents before children, so the caller can run
    /// the create-node hook over them in order.
    pub fn source_files<R: ContentRegistry>(&self, registry: &mut R) -> Result<Vec<RecordId>> {
        let mut created = Vec::new();
        for source in self.sources {
            let before = created.len();
            self.source_directory(source, registry, &mut created)?;
            info!(
                "sourced {} nodes from `{}` ({})",
                created.len() - before,
                source.name,
                source.path.display()
            );
        }
        Ok(created)
    }

    fn source_directory<R: ContentRegistry>(
        &self,
        source: &Source,
        registry: &mut R,
        created: &mut Vec<RecordId>,
    ) -> Result<()> {
        if !source.path.is_dir() {
            return Err(Error::MissingSource {
                name: source.name.clone(),
                path: source.path.clone(),
            });
        }

        let walker = WalkDir::new(&source.path).sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for result in walker {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            match self.source_file(source, entry.path(), registry, created) {
                Ok(()) => (),
                Err(e) => {
                    return Err(Error::Annotated(
                        format!("sourcing `{}`", entry.path().display()),
                        Box::new(e),
                    ))
                }
            }
        }
        Ok(())
    }

    fn source_file<R: ContentRegistry>(
        &self,
        source: &Source,
        path: &Path,
        registry: &mut R,
        created: &mut Vec<RecordId>,
    ) -> Result<()> {
        let contents = std::fs::read(path)?;
        let file = file_record(source, path)?;
        let extension = file.extension.to_lowercase();

        let file_id = RecordId::derive("File", &path.to_string_lossy());
        let digest = ContentDigest::of_bytes(&contents);
        let child = if extension == MARKDOWN_EXTENSION {
            Some(Record::Post(parse_post(std::str::from_utf8(&contents)?)?))
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Some(Record::Image(ImageRecord::default()))
        } else {
            None
        };

        debug!("{} -> {:?}", file.relative_path, child.as_ref().map(Record::kind));
        registry.create_node(Node {
            id: file_id.clone(),
            parent: None,
            digest: digest.clone(),
            record: Record::File(file),
        })?;
        created.push(file_id.clone());

        if let Some(record) = child {
            let id = RecordId::derive(record.kind(), file_id.as_str());
            registry.create_node(Node {
                id: id.clone(),
                parent: Some(file_id),
                digest,
                record,
            })?;
            created.push(id);
        }
        Ok(())
    }
}

/// Describes `path` relative to the root of `source`.
fn file_record(source: &Source, path: &Path) -> Result<FileRecord> {
    let invalid = || InvalidFileNameError(path.to_owned());
    let relative = path.strip_prefix(&source.path).map_err(|_| invalid())?;
    let components = relative
        .iter()
        .map(|c| c.to_str().ok_or_else(invalid))
        .collect::<std::result::Result<Vec<&str>, InvalidFileNameError>>()?;
    let (file_name, dirs) = components.split_last().ok_or_else(invalid)?;

    let (name, extension) = match file_name.rfind('.') {
        Some(i) if i > 0 => (&file_name[..i], &file_name[i + 1..]),
        _ => (*file_name, ""),
    };

    Ok(FileRecord {
        source_instance: source.name.clone(),
        absolute_path: path.to_owned(),
        relative_path: components.join("/"),
        relative_directory: dirs.join("/"),
        name: name.to_owned(),
        extension: extension.to_owned(),
    })
}

/// Parses a markdown post. The input is structured as follows:
///
/// 1. Initial frontmatter fence (`---` on a line of its own)
/// 2. YAML frontmatter with optional fields `title`, `description`, `date`,
///    and `authorId`
/// 3. Terminal frontmatter fence (`---` on a line of its own)
/// 4. Post body
///
/// For example:
///
/// ```md
/// ---
/// title: Hello, world!
/// date: 2021-04-16
/// authorId: joshj
/// ---
/// # Hello
///
/// World
/// ```
///
/// Input that doesn't open with a fence has empty frontmatter and is all
/// body.
pub fn parse_post(input: &str) -> Result<PostRecord> {
    fn frontmatter_indices(
        input: &str,
    ) -> Result<Option<(usize, usize, usize)>> {
        const FENCE: &str = "---";
        let mut lines = input.split_inclusive('\n').scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line))
        });
        let yaml_start = match lines.next() {
            Some((_, line)) if line.trim_end() == FENCE => line.len(),
            _ => return Ok(None),
        };
        match lines.find(|(_, line)| line.trim_end() == FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some((yaml_stop, line)) => {
                Ok(Some((yaml_start, yaml_stop, yaml_stop + line.len())))
            }
        }
    }

    let (frontmatter, body) = match frontmatter_indices(input)? {
        None => (Frontmatter::default(), input),
        Some((yaml_start, yaml_stop, body_start)) => {
            let yaml = &input[yaml_start..yaml_stop];
            let frontmatter = match yaml.trim().is_empty() {
                true => Frontmatter::default(),
                false => serde_yaml::from_str(yaml)?,
            };
            (frontmatter, &input[body_start..])
        }
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut post = PostRecord {
        frontmatter,
        ..PostRecord::default()
    };
    html::push_html(
        &mut post.html,
        MarkdownParser::new_ext(body, options),
    );
    Ok(post)
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error sourcing content files.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a markdown file isn't valid UTF-8.
    Utf8(std::str::Utf8Error),

    /// Returned when a configured source directory does not exist.
    MissingSource { name: String, path: PathBuf },

    /// Returned when the registry rejects a node.
    Registry(registry::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source path isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Utf8(err) => err.fmt(f),
            Error::MissingSource { name, path } => write!(
                f,
                "source `{}`: directory '{}' does not exist",
                name,
                path.display()
            ),
            Error::Registry(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Utf8(err) => Some(err),
            Error::MissingSource { .. } => None,
            Error::Registry(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Error {
        Error::Utf8(err)
    }
}

impl From<registry::Error> for Error {
    fn from(err: registry::Error) -> Error {
        Error::Registry(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible directory walks.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
