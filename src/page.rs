//! The materialization side of a build: the [`PageRequest`] and
//! [`FragmentDeclaration`] values handed to a renderer, the [`Host`] trait
//! that receives them, and [`Manifest`], a [`Host`] that simply collects them.

use crate::digest::RecordId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The alias under which a page refers to its author bio fragment.
pub const BIO_ALIAS: &str = "bio";

/// Returns the id of the bio fragment for `author_id`.
pub fn bio_fragment_id(author_id: &str) -> String {
    format!("bio--{}", author_id)
}

/// The variables a page template receives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub id: RecordId,
    pub previous_post_id: Option<RecordId>,
    pub next_post_id: Option<RecordId>,
}

/// A request to materialize one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// The URL path of the page.
    pub path: String,

    /// The template the page is rendered with.
    pub component: PathBuf,

    pub context: PageContext,

    /// Maps fragment aliases used by the template (e.g., `bio`) onto concrete
    /// fragment ids (e.g., `bio--joshj`).
    pub slices: BTreeMap<String, String>,
}

/// The variables a fragment's own query receives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FragmentContext {
    pub id: String,
}

/// Declares a reusable page region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FragmentDeclaration {
    pub id: String,
    pub component: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<FragmentContext>,
}

/// Receives the pages and fragments produced by a build.
pub trait Host {
    fn create_page(&mut self, page: PageRequest);
    fn create_slice(&mut self, fragment: FragmentDeclaration);
}

/// A [`Host`] that records everything it is given. Fragments are keyed by id,
/// so declaring the same fragment twice leaves a single entry.
#[derive(Debug, Default)]
pub struct Manifest {
    pub pages: Vec<PageRequest>,
    pub slices: BTreeMap<String, FragmentDeclaration>,
}

impl Manifest {
    pub fn new() -> Manifest {
        Manifest::default()
    }
}

impl Host for Manifest {
    fn create_page(&mut self, page: PageRequest) {
        self.pages.push(page);
    }

    fn create_slice(&mut self, fragment: FragmentDeclaration) {
        self.slices.insert(fragment.id.clone(), fragment);
    }
}
