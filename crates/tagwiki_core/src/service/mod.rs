//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate page store calls into request-level flows.
//! - Keep request handlers decoupled from storage details.

pub mod wiki_service;
