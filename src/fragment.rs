//! Declares the site's reusable fragments ("slices"): a header and footer
//! shared by every page, and one bio fragment per author.

use crate::author::AuthorRecord;
use crate::page::{
    bio_fragment_id, FragmentContext, FragmentDeclaration, Host, PageRequest,
    BIO_ALIAS,
};
use std::collections::BTreeSet;
use std::path::Path;

pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";

/// Declares the `header` and `footer` fragments and returns their ids.
pub fn declare_global_fragments<H: Host>(
    host: &mut H,
    header: &Path,
    footer: &Path,
) -> Vec<String> {
    let mut declared = Vec::with_capacity(2);
    for (id, component) in [(HEADER, header), (FOOTER, footer)] {
        host.create_slice(FragmentDeclaration {
            id: id.to_owned(),
            component: component.to_owned(),
            context: None,
        });
        declared.push(id.to_owned());
    }
    declared
}

/// Declares a `bio--{author_id}` fragment for each author, parameterized by
/// the author's id so the fragment can look the author up itself. Returns the
/// declared ids.
pub fn declare_author_fragments<H: Host>(
    host: &mut H,
    authors: &[AuthorRecord],
    component: &Path,
) -> Vec<String> {
    authors
        .iter()
        .map(|author| {
            let id = bio_fragment_id(&author.author_id);
            host.create_slice(FragmentDeclaration {
                id: id.clone(),
                component: component.to_owned(),
                context: Some(FragmentContext {
                    id: author.author_id.clone(),
                }),
            });
            id
        })
        .collect()
}

/// Returns `(page path, fragment id)` for every page whose bio binding names
/// a fragment missing from `declared`.
pub fn dangling_bios<'a>(
    pages: &'a [PageRequest],
    declared: &BTreeSet<String>,
) -> Vec<(&'a str, &'a str)> {
    pages
        .iter()
        .filter_map(|page| {
            page.slices
                .get(BIO_ALIAS)
                .filter(|fragment| !declared.contains(fragment.as_str()))
                .map(|fragment| (page.path.as_str(), fragment.as_str()))
        })
        .collect()
}
