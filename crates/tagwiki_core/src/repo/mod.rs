//! Repository layer: the only code that talks to the page store.
//!
//! # Responsibility
//! - Define the page storage contract used by services.
//! - Isolate SQLite and JSON document details from callers.
//!
//! # Invariants
//! - Writes validate the page before persistence.
//! - Lookups report a miss as `StoreError::NotFound`, distinct from
//!   connection, query and write failures.

pub mod page_repo;
