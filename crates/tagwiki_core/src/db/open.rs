//! Connection pool bootstrap for SQLite.
//!
//! # Responsibility
//! - Build file or in-memory connection pools.
//! - Configure every pooled connection with the pragmas the store relies on.
//! - Run schema migrations once before the pool is handed out.
//!
//! # Invariants
//! - Pooled connections have `foreign_keys=ON` and a busy timeout.
//! - Returned pools have migrations fully applied.
//! - The in-memory pool holds exactly one connection, so every checkout sees
//!   the same database.

use super::migrations::apply_migrations;
use super::{DbPool, DbResult};
use log::{error, info};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a pool over a SQLite database file and applies pending migrations.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Emits `pool_open` logging events with duration and status.
pub fn open_pool(path: impl AsRef<Path>, max_size: u32) -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
        configure_connection(conn)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
    });
    let builder = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_timeout(CHECKOUT_TIMEOUT);
    build_pool(builder, manager, "file")
}

/// Opens a single-connection in-memory pool and applies pending migrations.
///
/// Intended for tests and throwaway tooling; data is lost when the pool drops.
pub fn open_pool_in_memory() -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(configure_connection);
    let builder = r2d2::Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(CHECKOUT_TIMEOUT);
    build_pool(builder, manager, "memory")
}

fn build_pool(
    builder: r2d2::Builder<SqliteConnectionManager>,
    manager: SqliteConnectionManager,
    mode: &str,
) -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!("event=pool_open module=db status=start mode={mode}");

    let pool = match builder.build(manager) {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=pool_open module=db status=error mode={mode} duration_ms={} error_code=pool_build_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match migrate(&pool) {
        Ok(()) => {
            info!(
                "event=pool_open module=db status=ok mode={mode} max_size={} duration_ms={}",
                pool.max_size(),
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=pool_open module=db status=error mode={mode} duration_ms={} error_code=db_migration_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn migrate(pool: &DbPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    apply_migrations(&mut conn)
}

fn configure_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)
}
