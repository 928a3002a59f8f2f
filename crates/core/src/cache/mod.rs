//! SQLite-backed citation store.
//!
//! Persistent, content-addressed storage for upstream citation lookups using
//! SQLite with async access via tokio-rusqlite. It provides:
//!
//! - SHA-256 addressed rows keyed by the normalized reference
//! - Automatic schema migrations
//! - A single connection thread, so statements (sweep included) run one at a time
//! - Age-based eviction

pub mod citations;
pub mod connection;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use citations::{CachedCitation, CitationRecord, TalkRef};
pub use connection::CacheDb;
