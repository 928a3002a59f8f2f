//! Shared state for the HTTP and MCP surfaces.

use std::sync::Arc;

use citecache_core::{
    BookCatalog, CitationKey, CitationService, Error, ResolvedCitations, StalenessSweeper,
    scripture::parse_chapter,
};

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub service: CitationService,
    pub sweeper: StalenessSweeper,
    pub catalog: Arc<BookCatalog>,
}

/// Raw lookup fields as they arrive from a query string or tool call.
#[derive(Debug, Clone, Default)]
pub struct LookupRequest {
    pub volume: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<String>,
    pub verses: Option<String>,
}

impl AppState {
    pub fn new(service: CitationService, sweeper: StalenessSweeper) -> Self {
        Self { service, sweeper, catalog: Arc::new(BookCatalog::standard_works()) }
    }

    /// Validate a raw request into a normalized key.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` for missing or malformed fields,
    /// `Error::UnknownBook` when the book does not map to an id.
    pub fn citation_key(&self, request: &LookupRequest) -> Result<CitationKey, Error> {
        let book = required("book", request.book.as_deref())?;
        let chapter = parse_chapter(required("chapter", request.chapter.as_deref())?)?;
        let verses = required("verses", request.verses.as_deref())?;

        let book_id = self.catalog.resolve(request.volume.as_deref(), book)?;
        CitationKey::new(book_id, chapter, verses)
    }

    /// Validate and resolve a lookup through the cache.
    pub async fn lookup(&self, request: &LookupRequest) -> Result<ResolvedCitations, Error> {
        let key = self.citation_key(request)?;
        self.service.resolve(key).await
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, Error> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("missing required parameter `{field}`")))
}
