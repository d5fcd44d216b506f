//! Page store contract and SQLite implementation.
//!
//! # Responsibility
//! - Load one page by title, upsert pages, enumerate distinct tags.
//! - Keep SQL and JSON document layout inside the persistence boundary.
//!
//! # Invariants
//! - Every operation checks out its own pooled connection and releases it on
//!   return, success or failure.
//! - `save` stamps `timestamp` itself and writes with a single upsert
//!   statement; the stored row is fully replaced, never merged.
//! - Concurrent saves of the same title are last-writer-wins. There is no
//!   version check.
//! - Tag aggregation runs inside SQLite (`json_each`), not in process.

use crate::config::StoreConfig;
use crate::db::{open_pool, open_pool_in_memory, DbConn, DbError, DbPool};
use crate::model::page::{Page, PageValidationError};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info};
use rusqlite::{params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const PAGE_SELECT_SQL: &str = "SELECT title, body, tags, timestamp FROM pages";

const PAGE_UPSERT_SQL: &str = "INSERT INTO pages (title, body, tags, timestamp)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(title) DO UPDATE SET
        body = excluded.body,
        tags = excluded.tags,
        timestamp = excluded.timestamp;";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy of the page store.
#[derive(Debug)]
pub enum StoreError {
    /// No page with this title. Expected branch for pages not created yet.
    NotFound(String),
    /// Page rejected before reaching the store.
    Validation(PageValidationError),
    /// No pooled connection could be checked out.
    Connection(r2d2::Error),
    /// A read failed mid-operation.
    Query(rusqlite::Error),
    /// The upsert failed.
    Write(rusqlite::Error),
    /// A stored document could not be decoded.
    InvalidData(String),
    /// Store bootstrap failed.
    Db(DbError),
}

impl StoreError {
    /// Returns whether this is the lookup-miss branch rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(title) => write!(f, "page not found: {title}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Connection(err) => write!(f, "no store connection available: {err}"),
            Self::Query(err) => write!(f, "page query failed: {err}"),
            Self::Write(err) => write!(f, "page write failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored page data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) | Self::InvalidData(_) => None,
            Self::Validation(err) => Some(err),
            Self::Connection(err) => Some(err),
            Self::Query(err) | Self::Write(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<PageValidationError> for StoreError {
    fn from(value: PageValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Reads default to `Query`; write paths map their errors to `Write`.
impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}

/// Storage contract consumed by the wiki service.
pub trait PageRepository {
    /// Loads the page stored under `title`, or `StoreError::NotFound`.
    fn load(&self, title: &str) -> StoreResult<Page>;
    /// Stamps `page.timestamp` with the current time and upserts by title.
    fn save(&self, page: &mut Page) -> StoreResult<()>;
    /// Every tag value used by any page, each once, sorted ascending.
    fn distinct_tags(&self) -> StoreResult<Vec<String>>;
    /// Pages whose tag list contains `tag` exactly, sorted by title.
    fn pages_tagged(&self, tag: &str) -> StoreResult<Vec<Page>>;
    /// Every stored title, sorted ascending.
    fn list_titles(&self) -> StoreResult<Vec<String>>;
}

impl<T: PageRepository + ?Sized> PageRepository for &T {
    fn load(&self, title: &str) -> StoreResult<Page> {
        (**self).load(title)
    }

    fn save(&self, page: &mut Page) -> StoreResult<()> {
        (**self).save(page)
    }

    fn distinct_tags(&self) -> StoreResult<Vec<String>> {
        (**self).distinct_tags()
    }

    fn pages_tagged(&self, tag: &str) -> StoreResult<Vec<Page>> {
        (**self).pages_tagged(tag)
    }

    fn list_titles(&self) -> StoreResult<Vec<String>> {
        (**self).list_titles()
    }
}

/// SQLite-backed page store. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct SqlitePageStore {
    pool: DbPool,
}

impl SqlitePageStore {
    /// Wraps an already migrated pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens the file-backed store described by `config`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let pool = open_pool(&config.url, config.pool_size)?;
        Ok(Self::new(pool))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_pool_in_memory()?))
    }

    fn checkout(&self, event: &str) -> StoreResult<DbConn> {
        self.pool.get().map_err(|err| {
            error!(
                "event={event} module=store status=error error_code=no_connection error={err}"
            );
            StoreError::Connection(err)
        })
    }
}

impl PageRepository for SqlitePageStore {
    fn load(&self, title: &str) -> StoreResult<Page> {
        let started_at = Instant::now();
        let conn = self.checkout("page_load")?;
        let mut stmt = conn.prepare(&format!("{PAGE_SELECT_SQL} WHERE title = ?1;"))?;
        let mut rows = stmt.query([title])?;

        if let Some(row) = rows.next()? {
            let page = parse_page_row(row)?;
            debug!(
                "event=page_load module=store status=ok tags={} duration_ms={}",
                page.tags.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(page);
        }

        debug!(
            "event=page_load module=store status=not_found duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Err(StoreError::NotFound(title.to_string()))
    }

    fn save(&self, page: &mut Page) -> StoreResult<()> {
        page.validate()?;
        let started_at = Instant::now();
        let tags = serde_json::to_string(&page.tags)
            .map_err(|err| StoreError::InvalidData(format!("unencodable tags: {err}")))?;
        let conn = self.checkout("page_save")?;

        let stamped = Utc::now();
        page.timestamp = Some(stamped);

        if let Err(err) = conn.execute(
            PAGE_UPSERT_SQL,
            params![
                page.title.as_str(),
                page.body.as_str(),
                tags,
                encode_timestamp(&stamped),
            ],
        ) {
            error!(
                "event=page_save module=store status=error error_code=upsert_failed duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(StoreError::Write(err));
        }

        info!(
            "event=page_save module=store status=ok tags={} body_bytes={} duration_ms={}",
            page.tags.len(),
            page.body.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn distinct_tags(&self) -> StoreResult<Vec<String>> {
        let started_at = Instant::now();
        let conn = self.checkout("tags_distinct")?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT tag.value
             FROM pages, json_each(pages.tags) AS tag
             ORDER BY tag.value ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get::<_, String>(0)?);
        }

        debug!(
            "event=tags_distinct module=store status=ok count={} duration_ms={}",
            tags.len(),
            started_at.elapsed().as_millis()
        );
        Ok(tags)
    }

    fn pages_tagged(&self, tag: &str) -> StoreResult<Vec<Page>> {
        let conn = self.checkout("pages_tagged")?;
        let mut stmt = conn.prepare(&format!(
            "{PAGE_SELECT_SQL}
             WHERE EXISTS (
                SELECT 1
                FROM json_each(pages.tags) AS tag
                WHERE tag.value = ?1
             )
             ORDER BY title ASC;"
        ))?;
        let mut rows = stmt.query([tag])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }

    fn list_titles(&self) -> StoreResult<Vec<String>> {
        let conn = self.checkout("titles_list")?;
        let mut stmt = conn.prepare("SELECT title FROM pages ORDER BY title ASC;")?;
        let mut rows = stmt.query([])?;
        let mut titles = Vec::new();
        while let Some(row) = rows.next()? {
            titles.push(row.get("title")?);
        }
        Ok(titles)
    }
}

fn parse_page_row(row: &Row<'_>) -> StoreResult<Page> {
    let title: String = row.get("title")?;

    let tags_text: String = row.get("tags")?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid tags `{tags_text}` for page `{title}`: {err}"))
    })?;

    let timestamp_text: String = row.get("timestamp")?;
    let timestamp = decode_timestamp(&timestamp_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{timestamp_text}` for page `{title}`"
        ))
    })?;

    Ok(Page {
        body: row.get("body")?,
        tags,
        timestamp: Some(timestamp),
        title,
    })
}

fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::{decode_timestamp, encode_timestamp, StoreError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamp_encoding_keeps_sub_second_precision() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let encoded = encode_timestamp(&at);
        assert_eq!(encoded, "2023-11-14T22:13:20.123456789Z");
        assert_eq!(decode_timestamp(&encoded), Some(at));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode_timestamp("yesterday"), None);
    }

    #[test]
    fn only_lookup_miss_counts_as_not_found() {
        assert!(StoreError::NotFound("Missing".to_string()).is_not_found());
        assert!(!StoreError::InvalidData("bad".to_string()).is_not_found());
    }
}
