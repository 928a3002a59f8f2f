//! Citation resolution: freshness policy, cache coordinator and sweeper.

pub mod clock;
pub mod freshness;
pub mod service;
pub mod sweeper;
pub mod upstream;

pub use clock::{Clock, FixedClock, SystemClock};
pub use freshness::{CitationSource, FreshnessPolicy};
pub use service::{CitationService, ResolvedCitations, ResolverConfig};
pub use sweeper::{StalenessSweeper, next_run_after};
pub use upstream::{CitationFetcher, FetchError};
