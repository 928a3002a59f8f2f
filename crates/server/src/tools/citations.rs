//! citations_lookup tool implementation.
//!
//! Same read-through path as `GET /citations`: a fresh hit answers from the
//! store, a stale hit answers from the store and refreshes in the
//! background, and a miss fetches live.

use citecache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{AppState, LookupRequest};

/// Input parameters for the citations_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CitationsLookupParams {
    /// Volume of scripture, e.g. "Book of Mormon" or "bofm" (optional).
    #[serde(default)]
    pub volume: Option<String>,

    /// Book name, e.g. "1 Nephi".
    pub book: String,

    /// Chapter number (1-based).
    pub chapter: u32,

    /// Verse range such as "7", "1-3" or "1-3,5".
    pub verses: String,
}

impl From<CitationsLookupParams> for LookupRequest {
    fn from(p: CitationsLookupParams) -> Self {
        Self { volume: p.volume, book: Some(p.book), chapter: Some(p.chapter.to_string()), verses: Some(p.verses) }
    }
}

/// Implementation of the citations_lookup tool.
pub async fn lookup_impl(state: &AppState, params: CitationsLookupParams) -> Result<CallToolResult, McpError> {
    let resolved = state.lookup(&params.into()).await?;

    let json = serde_json::to_string_pretty(&resolved)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::test_support::*;

    fn params(book: &str, chapter: u32, verses: &str) -> CitationsLookupParams {
        CitationsLookupParams { volume: None, book: book.into(), chapter, verses: verses.into() }
    }

    fn text_of(result: &CallToolResult) -> serde_json::Value {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_live_then_cached() {
        let fetcher = Arc::new(StubFetcher::answering(talks()));
        let (state, _) = state_with(fetcher.clone()).await;

        let output = text_of(&lookup_impl(&state, params("Moroni", 10, "4-5")).await.unwrap());
        assert_eq!(output["bookId"], 219);
        assert_eq!(output["verseSpec"], "4-5");
        assert_eq!(output["source"], "live");

        let output = text_of(&lookup_impl(&state, params("moroni", 10, "4 – 5")).await.unwrap());
        assert_eq!(output["source"], "cache-fresh");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_error_codes() {
        let (state, _) = state_with(Arc::new(StubFetcher::failing())).await;

        let err = lookup_impl(&state, params("Hezekiah", 1, "1")).await.unwrap_err();
        assert_eq!(err.code.0, -32003);

        let err = lookup_impl(&state, params("Alma", 0, "1")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);

        let err = lookup_impl(&state, params("Alma", 32, "21")).await.unwrap_err();
        assert_eq!(err.code.0, -32006);
    }
}
