//! Core of the tag wiki: page model, link rendering and the page store.
//! HTTP routing, form decoding and HTML templating live outside this crate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig, WikiConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::page::{
    format_timestamp, is_routable_title, parse_tags, Page, PageValidationError, FRONT_PAGE_TITLE,
};
pub use render::link::{link_pages, linked_titles};
pub use render::RenderedPage;
pub use repo::page_repo::{PageRepository, SqlitePageStore, StoreError, StoreResult};
pub use service::wiki_service::{ViewOutcome, WikiService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
