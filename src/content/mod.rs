//! Content resolution - locale dictionaries backed by the content table.
//!
//! ## Architecture
//!
//! - `dictionary` - nested dictionary type and the static/dynamic merge
//! - `assembler` - rows from the store → merged dictionary
//! - `cache` - process-wide cache with tag invalidation and static fallback

mod assembler;
mod cache;
mod dictionary;

pub use assembler::DictionaryAssembler;
pub use cache::{DictionaryCache, DictionarySource, Resolved, DEFAULT_TTL, DICTIONARY_TAG};
pub use dictionary::{merge, parse_content_value, Dictionary};
