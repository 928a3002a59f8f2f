//! Cache maintenance MCP tools.

pub mod sweep;

pub use sweep::{CacheSweepParams, sweep_impl};
