//! cache_sweep tool implementation.
//!
//! Runs one eviction pass immediately, outside the daily schedule.

use citecache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the cache_sweep tool. Takes none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheSweepParams {}

/// Output from the cache_sweep tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSweepOutput {
    /// Number of records deleted.
    pub evicted: u64,
}

/// Implementation of the cache_sweep tool.
pub async fn sweep_impl(state: &AppState, _params: CacheSweepParams) -> Result<CallToolResult, McpError> {
    let evicted = state.sweeper.run().await?;

    let output = CacheSweepOutput { evicted };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
