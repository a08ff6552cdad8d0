//! The library code for `bylines`, the build configuration of a multi-author
//! blog. A build runs in three steps:
//!
//! 1. Sourcing: the fixed author catalog ([`crate::author`]) and the content
//!    files under each configured source ([`crate::parser`]) are inserted into
//!    a content registry ([`crate::registry`]), and every new node passes
//!    through the create-node hook ([`crate::fields`]) which derives post
//!    slugs ([`crate::slug`]) and tags author avatars.
//! 2. Page creation: the header, footer and per-author bio fragments are
//!    declared ([`crate::fragment`]), then the date-ordered posts are linked
//!    to their neighbors and bound to their author's bio ([`crate::link`]).
//! 3. Output: the resulting page requests and fragment declarations are
//!    written out as a manifest for a renderer ([`crate::write`]).
//!
//! [`crate::build`] stitches the steps together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod author;
pub mod build;
pub mod config;
pub mod digest;
pub mod fields;
pub mod fragment;
pub mod link;
pub mod page;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod slug;
pub mod write;
