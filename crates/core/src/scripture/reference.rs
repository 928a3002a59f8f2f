//! Normalized citation keys.
//!
//! A [`CitationKey`] is the only way a reference reaches the store, so all
//! case and whitespace folding happens here. Two spellings of the same
//! passage always produce byte-identical keys.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Composite identity of a cached citation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationKey {
    pub book_id: i64,
    pub chapter: u32,
    pub verse_spec: String,
}

impl CitationKey {
    /// Build a key from raw parts, validating and normalizing the verse spec.
    pub fn new(book_id: i64, chapter: u32, verse_spec: &str) -> Result<Self, Error> {
        if book_id <= 0 {
            return Err(Error::InvalidInput(format!("book id must be positive, got {book_id}")));
        }
        if chapter == 0 {
            return Err(Error::InvalidInput("chapter must be a positive integer".into()));
        }
        let verse_spec = normalize_verse_spec(verse_spec)?;
        Ok(Self { book_id, chapter, verse_spec })
    }
}

impl std::fmt::Display for CitationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.book_id, self.chapter, self.verse_spec)
    }
}

/// Parse a chapter query value into a positive integer.
pub fn parse_chapter(raw: &str) -> Result<u32, Error> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(0) => Err(Error::InvalidInput("chapter must be a positive integer".into())),
        Ok(n) => Ok(n),
        Err(_) => Err(Error::InvalidInput(format!("chapter must be a positive integer, got {trimmed:?}"))),
    }
}

/// Normalize a verse range such as `"1"`, `"1-2"` or `"3, 5 – 7"`.
///
/// Grammar: `range ("," range)*` where `range = N | N "-" M` and `1 <= N <= M`.
/// Whitespace is dropped and en/em dashes become `-`.
pub fn normalize_verse_spec(raw: &str) -> Result<String, Error> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect();

    if compact.is_empty() {
        return Err(Error::InvalidInput("verses must not be empty".into()));
    }

    let mut ranges = Vec::new();
    for segment in compact.split(',') {
        let (start, end) = match segment.split_once('-') {
            Some((start, end)) => (parse_verse(start, raw)?, parse_verse(end, raw)?),
            None => {
                let verse = parse_verse(segment, raw)?;
                (verse, verse)
            }
        };
        if end < start {
            return Err(Error::InvalidInput(format!("verse range {start}-{end} is reversed")));
        }
        ranges.push(if start == end { start.to_string() } else { format!("{start}-{end}") });
    }

    Ok(ranges.join(","))
}

fn parse_verse(digits: &str, raw: &str) -> Result<u32, Error> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInput(format!("malformed verses {raw:?}")));
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidInput(format!("malformed verses {raw:?}"))),
        Ok(n) => Ok(n),
    }
}
