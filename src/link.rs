//! The page linker: turns the date-ordered post list into one
//! [`PageRequest`] per post, each linked to its neighbors and bound to its
//! author's bio fragment.

use crate::digest::RecordId;
use crate::page::{bio_fragment_id, PageContext, PageRequest, BIO_ALIAS};
use crate::registry::Post;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Creates a [`PageRequest`] for every post in `posts`, in order. `posts` must
/// already be sorted; the post at `i` links back to `i - 1` and forward to
/// `i + 1`, with `None` at either end. All posts are checked before any
/// request is returned, so an error means no pages at all.
pub fn link_pages(posts: &[Post], component: &Path) -> Result<Vec<PageRequest>> {
    posts
        .iter()
        .enumerate()
        .map(|(i, post)| -> Result<PageRequest> {
            let path = post
                .fields
                .slug
                .clone()
                .ok_or_else(|| Error::MissingSlug(post.id.clone()))?;

            let mut slices = BTreeMap::new();
            if let Some(author_id) = &post.frontmatter.author_id {
                slices.insert(BIO_ALIAS.to_owned(), bio_fragment_id(author_id));
            }

            Ok(PageRequest {
                path,
                component: component.to_owned(),
                context: PageContext {
                    id: post.id.clone(),
                    previous_post_id: match i {
                        0 => None,
                        _ => Some(posts[i - 1].id.clone()),
                    },
                    next_post_id: posts.get(i + 1).map(|next| next.id.clone()),
                },
                slices,
            })
        })
        .collect()
}

/// The result of linking pages.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a post that cannot be turned into a page.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when a post has no slug to serve it under.
    MissingSlug(RecordId),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingSlug(id) => write!(f, "post `{}` has no slug", id),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::digest::ContentDigest;
    use crate::registry::{ContentRegistry, MemoryRegistry, Node, PostRecord, Record};
    use crate::schema::{parse_date, Frontmatter, PostFields};

    fn post(key: &str, author_id: &str) -> Post {
        Post {
            id: RecordId::from(key),
            frontmatter: Frontmatter {
                author_id: Some(author_id.to_owned()),
                ..Frontmatter::default()
            },
            fields: PostFields {
                slug: Some(format!("/{}/", key)),
            },
        }
    }

    fn ids(keys: &[&str]) -> Vec<Post> {
        keys.iter().map(|key| post(key, "kylem")).collect()
    }

    #[test]
    fn test_neighbors() -> Result<()> {
        let posts = ids(&["a", "b", "c", "d"]);
        let pages = link_pages(&posts, Path::new("blog-post.js"))?;

        assert_eq!(posts.len(), pages.len());
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(posts[i].id, page.context.id);
            assert_eq!(format!("/{}/", posts[i].id), page.path);
            assert_eq!(
                match i {
                    0 => None,
                    _ => Some(posts[i - 1].id.clone()),
                },
                page.context.previous_post_id
            );
            assert_eq!(
                posts.get(i + 1).map(|p| p.id.clone()),
                page.context.next_post_id
            );
        }
        Ok(())
    }

    #[test]
    fn test_empty() -> Result<()> {
        assert!(link_pages(&[], Path::new("blog-post.js"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_single_post_has_no_neighbors() -> Result<()> {
        let pages = link_pages(&ids(&["only"]), Path::new("blog-post.js"))?;
        assert_eq!(1, pages.len());
        assert_eq!(None, pages[0].context.previous_post_id);
        assert_eq!(None, pages[0].context.next_post_id);
        Ok(())
    }

    #[test]
    fn test_bio_binding() -> Result<()> {
        let pages = link_pages(
            &[post("a", "joshj"), post("b", "kylem")],
            Path::new("blog-post.js"),
        )?;
        assert_eq!(Some(&"bio--joshj".to_owned()), pages[0].slices.get("bio"));
        assert_eq!(Some(&"bio--kylem".to_owned()), pages[1].slices.get("bio"));
        assert_eq!(Path::new("blog-post.js"), pages[0].component);
        Ok(())
    }

    #[test]
    fn test_post_without_author_has_no_bio() -> Result<()> {
        let mut anonymous = post("a", "unused");
        anonymous.frontmatter.author_id = None;
        let pages = link_pages(&[anonymous], Path::new("blog-post.js"))?;
        assert!(pages[0].slices.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_slug_yields_no_pages() {
        let mut posts = ids(&["a", "b", "c"]);
        posts[2].fields.slug = None;
        assert_eq!(
            Err(Error::MissingSlug(RecordId::from("c"))),
            link_pages(&posts, Path::new("blog-post.js"))
        );
    }

    #[test]
    fn test_links_follow_date_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut registry = MemoryRegistry::new();
        for (key, date) in &[("jan", "2020-01-01"), ("jun", "2020-06-01"), ("mar", "2020-03-01")] {
            registry.create_node(Node {
                id: RecordId::from(*key),
                parent: None,
                digest: ContentDigest::of_bytes(key.as_bytes()),
                record: Record::Post(PostRecord {
                    frontmatter: Frontmatter {
                        date: parse_date(date),
                        ..Frontmatter::default()
                    },
                    fields: PostFields {
                        slug: Some(format!("/{}/", key)),
                    },
                    ..PostRecord::default()
                }),
            })?;
        }

        let pages = link_pages(&registry.posts_by_date(1000)?, Path::new("blog-post.js"))?;
        let order: Vec<&str> = pages.iter().map(|p| p.context.id.as_str()).collect();
        assert_eq!(vec!["jan", "mar", "jun"], order);

        let march = &pages[1];
        assert_eq!(Some(RecordId::from("jan")), march.context.previous_post_id);
        assert_eq!(Some(RecordId::from("jun")), march.context.next_post_id);
        Ok(())
    }
}
