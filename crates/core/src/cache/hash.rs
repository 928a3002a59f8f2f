//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

use crate::scripture::CitationKey;

/// Compute the row address for a normalized citation key.
///
/// The key must already be normalized; no folding happens here.
pub fn compute_citation_hash(key: &CitationKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.book_id.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(key.chapter.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(key.verse_spec.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(book_id: i64, chapter: u32, verses: &str) -> CitationKey {
        CitationKey { book_id, chapter, verse_spec: verses.to_string() }
    }

    #[test]
    fn test_hash_stability() {
        assert_eq!(compute_citation_hash(&key(1, 3, "16")), compute_citation_hash(&key(1, 3, "16")));
    }

    #[test]
    fn test_hash_separates_components() {
        assert_ne!(compute_citation_hash(&key(1, 31, "6")), compute_citation_hash(&key(1, 3, "16")));
        assert_ne!(compute_citation_hash(&key(11, 3, "16")), compute_citation_hash(&key(1, 13, "16")));
    }

    #[test]
    fn test_hash_is_byte_exact() {
        assert_ne!(compute_citation_hash(&key(1, 3, "1-2")), compute_citation_hash(&key(1, 3, "1 - 2")));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_citation_hash(&key(1, 3, "16"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
