//! Core types and shared functionality for citecache.
//!
//! This crate provides:
//! - The SQLite citation store
//! - Scripture references and the book catalog
//! - The cache coordinator and staleness sweeper
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod resolver;
pub mod scripture;

pub use cache::{CacheDb, CitationRecord, TalkRef};
pub use config::{AppConfig, ConfigError, Transport};
pub use error::Error;
pub use resolver::{
    CitationFetcher, CitationService, CitationSource, Clock, FetchError, FixedClock, FreshnessPolicy,
    ResolvedCitations, ResolverConfig, StalenessSweeper, SystemClock, next_run_after,
};
pub use scripture::{BookCatalog, CitationKey, Volume};
