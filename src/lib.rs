//! The library code for the `notehouse` blog builder. Notes are small text
//! files with a `# ` title line, optional `tags:` and `date:` lines, and a
//! body. There are two ways to publish them:
//!
//! 1. Inserting rendered entries straight into a hand-written index page
//!    ([`crate::build`]). Each entry lands in its category's section and in
//!    the catch-all section, newest first, and an entry whose title is
//!    already on the page is skipped.
//! 2. Writing a manifest of note files ([`crate::manifest`]) which the page
//!    fetches and renders on load ([`crate::client`]).
//!
//! Both paths share one parser ([`crate::note`]) and one escaping renderer
//! ([`crate::render`]). The host page is patched through a small element tree
//! ([`crate::dom`], [`crate::section`]) which leaves everything outside the
//! edited entry list untouched.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod client;
pub mod config;
pub mod dom;
pub mod manifest;
pub mod note;
pub mod render;
pub mod section;
