//! Bracket-token link rewriting.
//!
//! # Responsibility
//! - Turn `[Name]` tokens in raw page bodies into `/view/Name` anchors.
//!
//! # Invariants
//! - A token is `[` + one or more ASCII letters + `]`. Digits, punctuation and
//!   empty brackets never match.
//! - Matches are leftmost and non-overlapping; text outside matches is copied
//!   byte-for-byte.
//! - Captured names are inserted without escaping (letters only).
//! - There is no escape syntax for literal bracketed words.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static PAGE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([a-zA-Z]+)\]").expect("valid page link regex"));

/// Rewrites every bracket token in `body` into a page link.
///
/// Borrows the input unchanged when it contains no token.
pub fn link_pages(body: &str) -> Cow<'_, str> {
    PAGE_LINK_RE.replace_all(body, |caps: &Captures<'_>| page_anchor(&caps[1]))
}

/// Lists the page names referenced by bracket tokens, in body order.
pub fn linked_titles(body: &str) -> Vec<&str> {
    PAGE_LINK_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

fn page_anchor(name: &str) -> String {
    format!("<a href=\"/view/{name}\">{name}</a>")
}
