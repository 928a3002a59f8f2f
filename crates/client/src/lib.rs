//! Client code for citecache.
//!
//! This crate provides the HTTP client for the upstream citation index,
//! used by the server as the resolver's fetcher.

pub mod citations;

pub use citations::{CitationApiError, CitationClient, CitationClientConfig, CitationPayload};
