//! MCP tool implementations.
//!
//! This module contains all tools exposed by the citecache server.

pub mod cache;
pub mod citations;

pub use cache::{CacheSweepParams, sweep_impl};
pub use citations::{CitationsLookupParams, lookup_impl};
