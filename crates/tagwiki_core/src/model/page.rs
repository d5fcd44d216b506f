//! Page domain model.
//!
//! # Responsibility
//! - Define the single wiki record stored in the `pages` collection.
//! - Expose pure, display-oriented views of that record.
//!
//! # Invariants
//! - `title` is the lookup/upsert key and is never empty once persisted.
//! - `timestamp` is assigned by the store on save; callers never supply it.
//! - Saving replaces the whole record, so an empty `tags` list erases tags.

use crate::render::link::link_pages;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title of the page the wiki root redirects to.
pub const FRONT_PAGE_TITLE: &str = "FrontPage";

/// Separator used both to split submitted tag strings and to render tags.
pub const TAG_SEPARATOR: &str = ", ";

const TIMESTAMP_LAYOUT: &str = "%b %-d, %Y at %-I:%M%P (%Z)";

static ROUTABLE_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("valid title regex"));

/// Validation error for page invariants enforced before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageValidationError {
    EmptyTitle,
}

impl Display for PageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "page title cannot be empty"),
        }
    }
}

impl Error for PageValidationError {}

/// One wiki page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Unique key. Never renamed by save.
    pub title: String,
    /// Raw user-entered content, possibly containing `[Name]` tokens.
    pub body: String,
    /// Free-form tags. Order and duplicates are kept as entered.
    pub tags: Vec<String>,
    /// Time of the last successful save, `None` before the first one.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Page {
    /// Builds an unsaved page from submitted fields.
    pub fn new(title: impl Into<String>, body: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tags,
            timestamp: None,
        }
    }

    /// Empty page used as the edit template for titles that do not exist yet.
    pub fn blank(title: impl Into<String>) -> Self {
        Self::new(title, String::new(), Vec::new())
    }

    /// Checks the invariants required before the page can be persisted.
    pub fn validate(&self) -> Result<(), PageValidationError> {
        if self.title.is_empty() {
            return Err(PageValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Body with every `[Name]` token turned into a link to `/view/Name`.
    pub fn rendered_body(&self) -> String {
        link_pages(&self.body).into_owned()
    }

    /// Save time as `Mon D, YYYY at H:MMam (ZONE)`, or empty when never saved.
    pub fn rendered_timestamp(&self) -> String {
        self.timestamp
            .map(|timestamp| format_timestamp(&timestamp))
            .unwrap_or_default()
    }

    /// Tags joined with `", "`.
    pub fn rendered_tags(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

/// Formats a save time with the fixed display layout.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_LAYOUT).to_string()
}

/// Splits a submitted tag string on the literal `", "` separator.
///
/// An empty string yields no tags. Segments are kept verbatim, including
/// duplicates and empty segments produced by repeated separators.
pub fn parse_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(TAG_SEPARATOR).map(str::to_string).collect()
}

/// Returns whether `title` is accepted by the `/view|edit|save/<title>` routes.
pub fn is_routable_title(title: &str) -> bool {
    ROUTABLE_TITLE_RE.is_match(title)
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, is_routable_title, parse_tags, Page};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamp_uses_twelve_hour_layout_with_zone() {
        let at = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(&at), "Jan 2, 2006 at 3:04pm (UTC)");

        let morning = Utc.with_ymd_and_hms(2024, 11, 30, 0, 7, 0).unwrap();
        assert_eq!(format_timestamp(&morning), "Nov 30, 2024 at 12:07am (UTC)");
    }

    #[test]
    fn unsaved_page_renders_empty_timestamp() {
        assert_eq!(Page::blank("Draft").rendered_timestamp(), "");
    }

    #[test]
    fn parse_tags_splits_on_comma_space_only() {
        assert!(parse_tags("").is_empty());
        assert_eq!(parse_tags("rust"), vec!["rust"]);
        assert_eq!(parse_tags("a, b, a"), vec!["a", "b", "a"]);
        assert_eq!(parse_tags("a,b"), vec!["a,b"]);
    }

    #[test]
    fn routable_titles_are_alphanumeric() {
        assert!(is_routable_title("FrontPage2"));
        assert!(!is_routable_title(""));
        assert!(!is_routable_title("Front Page"));
        assert!(!is_routable_title("../etc"));
    }
}
