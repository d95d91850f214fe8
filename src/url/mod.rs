//! URL handling module for Site-Mirror
//!
//! This module decides which URLs belong to the crawl and turns the raw
//! references found in HTML into absolute, fragment-free URLs.

mod resolve;
mod scope;

pub use resolve::resolve_link;
pub use scope::should_fetch;
