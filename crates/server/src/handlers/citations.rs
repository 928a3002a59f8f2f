//! `GET /citations` read endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use citecache_core::ResolvedCitations;
use serde::Deserialize;

use crate::{
    error::ApiError,
    state::{AppState, LookupRequest},
};

/// Query string for a lookup. All fields are optional here so that a
/// missing one surfaces as a 400 with the common error body.
#[derive(Debug, Default, Deserialize)]
pub struct CitationQuery {
    pub volume: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<String>,
    pub verses: Option<String>,
}

impl From<CitationQuery> for LookupRequest {
    fn from(q: CitationQuery) -> Self {
        Self { volume: q.volume, book: q.book, chapter: q.chapter, verses: q.verses }
    }
}

/// GET /citations?volume=&book=&chapter=&verses=
///
/// Returns the talks citing the passage and whether they came from a fresh
/// cache hit, a stale hit (refreshed in the background) or a live fetch.
pub async fn get_citations(
    State(state): State<AppState>, Query(query): Query<CitationQuery>,
) -> Result<Json<ResolvedCitations>, ApiError> {
    let request = LookupRequest::from(query);
    let resolved = state.lookup(&request).await?;

    tracing::info!(
        book_id = resolved.key.book_id,
        chapter = resolved.key.chapter,
        verses = %resolved.key.verse_spec,
        source = resolved.source.as_str(),
        talks = resolved.talks.len(),
        "citations served"
    );

    Ok(Json(resolved))
}
