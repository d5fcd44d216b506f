//! Wiki use-case service.
//!
//! # Responsibility
//! - Serve the view/edit/save/tag flows a request handler needs.
//! - Turn store lookups into view outcomes and submitted fields into pages.
//!
//! # Invariants
//! - A missing page is a normal outcome (redirect or blank template), never an
//!   error returned to the caller.
//! - Store failures propagate unchanged; nothing is retried.
//! - Timestamps supplied by callers are ignored; the store stamps saves.

use crate::model::page::{parse_tags, Page};
use crate::render::RenderedPage;
use crate::repo::page_repo::{PageRepository, StoreError, StoreResult};
use log::warn;

/// Result of opening a page for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The page exists and is ready for the view template.
    Render(RenderedPage),
    /// The page does not exist; send the client to `/edit/<title>`.
    RedirectToEdit(String),
}

/// Wiki service facade over a page repository.
pub struct WikiService<R: PageRepository> {
    repo: R,
}

impl<R: PageRepository> WikiService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads and renders `title`, or asks for a redirect to its edit form.
    pub fn load_page_for_view(&self, title: &str) -> StoreResult<ViewOutcome> {
        match self.repo.load(title) {
            Ok(page) => Ok(ViewOutcome::Render(RenderedPage::from_page(&page))),
            Err(StoreError::NotFound(title)) => Ok(ViewOutcome::RedirectToEdit(title)),
            Err(err) => Err(err),
        }
    }

    /// Loads `title` for editing, or a blank page carrying that title.
    pub fn load_page_for_edit(&self, title: &str) -> StoreResult<Page> {
        match self.repo.load(title) {
            Ok(page) => Ok(page),
            Err(StoreError::NotFound(_)) => Ok(Page::blank(title)),
            Err(err) => Err(err),
        }
    }

    /// Builds a page from submitted form fields and upserts it.
    ///
    /// `raw_tags` is split on `", "`. Returns the page as stored, including
    /// the save timestamp.
    pub fn save_page(&self, title: &str, raw_body: &str, raw_tags: &str) -> StoreResult<Page> {
        let mut page = Page::new(title, raw_body, parse_tags(raw_tags));
        if let Err(err) = self.repo.save(&mut page) {
            warn!("event=page_save module=service status=error error={err}");
            return Err(err);
        }
        Ok(page)
    }

    /// Every tag used across the wiki, each once.
    pub fn distinct_tags(&self) -> StoreResult<Vec<String>> {
        self.repo.distinct_tags()
    }

    /// Rendered pages carrying `tag`, for topic browsing.
    pub fn pages_tagged(&self, tag: &str) -> StoreResult<Vec<RenderedPage>> {
        let pages = self.repo.pages_tagged(tag)?;
        Ok(pages.iter().map(RenderedPage::from_page).collect())
    }

    /// Every page title, sorted.
    pub fn list_titles(&self) -> StoreResult<Vec<String>> {
        self.repo.list_titles()
    }
}
