//! Scripture references: book catalog and normalized citation keys.

pub mod books;
pub mod reference;

pub use books::{Book, BookCatalog, Volume};
pub use reference::{CitationKey, normalize_verse_spec, parse_chapter};
