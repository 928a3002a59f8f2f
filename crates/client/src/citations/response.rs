//! Citation index response decoding.

use citecache_core::TalkRef;
use serde::Deserialize;

use super::error::CitationApiError;

/// Raw body from the citation index. Either a bare list of talks or an
/// envelope with a `talks` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CitationPayload {
    Talks(Vec<TalkRef>),
    Envelope { talks: Vec<TalkRef> },
}

impl CitationPayload {
    /// Decode a response body into the talk list, order preserved.
    pub fn parse(bytes: &[u8]) -> Result<Vec<TalkRef>, CitationApiError> {
        let payload: CitationPayload =
            serde_json::from_slice(bytes).map_err(|e| CitationApiError::Parse(e.to_string()))?;
        Ok(payload.into_talks())
    }

    pub fn into_talks(self) -> Vec<TalkRef> {
        match self {
            CitationPayload::Talks(talks) | CitationPayload::Envelope { talks } => talks,
        }
    }
}
