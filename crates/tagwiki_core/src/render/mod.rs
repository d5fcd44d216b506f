//! Display projections handed to the view layer.
//!
//! # Responsibility
//! - Compose the page views (linked body, timestamp, tags) into one value.
//!
//! # Invariants
//! - Rendering is pure: no storage access, no failure modes.
//! - Only the link substitution emits markup; HTML escaping of every other
//!   text node belongs to the view layer.

pub mod link;

use crate::model::page::Page;
use serde::Serialize;

/// View-ready page bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub title: String,
    /// Raw body, for edit forms.
    pub body: String,
    /// Body with bracket tokens rewritten into links.
    pub rendered_body: String,
    /// Empty for pages that were never saved.
    pub rendered_timestamp: String,
    pub rendered_tags: String,
    pub tags: Vec<String>,
}

impl RenderedPage {
    pub fn from_page(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            body: page.body.clone(),
            rendered_body: page.rendered_body(),
            rendered_timestamp: page.rendered_timestamp(),
            rendered_tags: page.rendered_tags(),
            tags: page.tags.clone(),
        }
    }
}

impl From<&Page> for RenderedPage {
    fn from(page: &Page) -> Self {
        Self::from_page(page)
    }
}
