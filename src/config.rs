//! Loads the project file (`bylines.yaml`) into a [`Config`]. All paths in the
//! project file are relative to the directory that contains it.

use crate::schema::SiteMetadata;
use crate::slug::SlugOptions;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file.
pub const PROJECT_FILE: &str = "bylines.yaml";

/// The output directory used when none is given, relative to the project root.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "public";

/// A named directory of content files.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Source {
    pub name: String,
    pub path: PathBuf,
}

/// The templates pages and fragments are rendered with.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Components {
    pub blog_post: PathBuf,
    pub bio: PathBuf,
    pub header: PathBuf,
    pub footer: PathBuf,
}

#[derive(Deserialize)]
struct PostLimit(usize);
impl Default for PostLimit {
    fn default() -> Self {
        PostLimit(1000)
    }
}

#[derive(Deserialize)]
struct TrailingSlash(bool);
impl Default for TrailingSlash {
    fn default() -> Self {
        TrailingSlash(true)
    }
}

#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    site: SiteMetadata,
    sources: Vec<Source>,
    components: Components,

    #[serde(default)]
    post_limit: PostLimit,

    #[serde(default)]
    trailing_slash: TrailingSlash,

    #[serde(default)]
    slugify: bool,

    #[serde(default)]
    strict_authors: bool,
}

/// Everything a build needs, with every path resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub project_root: PathBuf,
    pub site: SiteMetadata,
    pub sources: Vec<Source>,
    pub components: Components,

    /// The maximum number of posts the post query returns.
    pub post_limit: usize,

    pub slug_options: SlugOptions,

    /// Fail the build when a post names an author with no bio fragment.
    pub strict_authors: bool,

    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for [`PROJECT_FILE`] and
    /// loads the first one found.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory);
            }
            current = dir.parent();
        }
        Err(Error::ProjectNotFound(dir.to_owned()))
    }

    /// Loads the project file at `path`. `output_directory` defaults to
    /// [`DEFAULT_OUTPUT_DIRECTORY`] under the project root.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::ProjectNotFound(path.to_owned()))?
            .to_owned();
        Config::from_project(project, project_root, output_directory)
    }

    fn from_project(
        project: Project,
        project_root: PathBuf,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let components = Components {
            blog_post: project_root.join(&project.components.blog_post),
            bio: project_root.join(&project.components.bio),
            header: require_component(&project_root, "header", &project.components.header)?,
            footer: require_component(&project_root, "footer", &project.components.footer)?,
        };

        Ok(Config {
            site: project.site,
            sources: project
                .sources
                .into_iter()
                .map(|source| Source {
                    path: project_root.join(&source.path),
                    name: source.name,
                })
                .collect(),
            components,
            post_limit: project.post_limit.0,
            slug_options: SlugOptions {
                trailing_slash: project.trailing_slash.0,
                slugify: project.slugify,
            },
            strict_authors: project.strict_authors,
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(DEFAULT_OUTPUT_DIRECTORY),
            },
            project_root,
        })
    }
}

/// Resolves a component path that must already exist.
fn require_component(project_root: &Path, name: &'static str, relative: &Path) -> Result<PathBuf> {
    let path = project_root.join(relative);
    match path.is_file() {
        true => Ok(path),
        false => Err(Error::MissingComponent { name, path }),
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when no project file exists in a directory or its ancestors.
    ProjectNotFound(PathBuf),

    /// Returned when the project file cannot be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file is not valid.
    Parse { path: PathBuf, err: serde_yaml::Error },

    /// Returned when a component that must exist is missing.
    MissingComponent { name: &'static str, path: PathBuf },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectNotFound(dir) => write!(
                f,
                "Could not find `{}` in '{}' or any parent directory",
                PROJECT_FILE,
                dir.display()
            ),
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::MissingComponent { name, path } => {
                write!(f, "Resolving {} component '{}': no such file", name, path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectNotFound(_) => None,
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::MissingComponent { .. } => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_project_file() -> Result<()> {
        let root = Path::new("./testdata/site");
        let config = Config::from_project_file(&root.join(PROJECT_FILE), None)?;

        assert_eq!(root, config.project_root);
        assert_eq!(Some("kylem".to_owned()), config.site.author);
        assert_eq!(
            vec![root.join("content/blog"), root.join("content/assets")],
            config.sources.iter().map(|s| s.path.clone()).collect::<Vec<_>>()
        );
        assert_eq!(root.join("src/components/header.js"), config.components.header);
        assert_eq!(root.join("src/templates/blog-post.js"), config.components.blog_post);
        assert_eq!(root.join(DEFAULT_OUTPUT_DIRECTORY), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_project_file(Path::new("./testdata/site/bylines.yaml"), None)?;
        assert_eq!(1000, config.post_limit);
        assert_eq!(SlugOptions::default(), config.slug_options);
        assert!(!config.strict_authors);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let config = Config::from_directory(
            Path::new("./testdata/site/content/blog"),
            Some(Path::new("/tmp/out")),
        )?;
        assert_eq!(Path::new("./testdata/site"), config.project_root);
        assert_eq!(Path::new("/tmp/out"), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_missing_header_component() -> std::result::Result<(), serde_yaml::Error> {
        let project: Project = serde_yaml::from_str(
            "sources: []\n\
             components:\n  \
               blog_post: a.js\n  \
               bio: b.js\n  \
               header: nope.js\n  \
               footer: nope.js\n",
        )?;
        assert!(matches!(
            Config::from_project(project, PathBuf::from("./testdata/site"), None),
            Err(Error::MissingComponent { name: "header", .. })
        ));
        Ok(())
    }
}
