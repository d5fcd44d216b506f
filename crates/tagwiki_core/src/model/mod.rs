//! Wiki domain model.
//!
//! # Responsibility
//! - Define the page record shared by storage, rendering and services.
//!
//! # Invariants
//! - Pages are identified by `title`; there is no surrogate id.
//! - Pages are never deleted by core code.

pub mod page;
