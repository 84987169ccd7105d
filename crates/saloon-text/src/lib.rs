//! saloon-text
//!
//! Tantivy-backed index store for forum topics and replies. `index` owns
//! the index lifecycle and the single writer, `search` runs query-string
//! searches with per-field highlighting.
pub mod tantivy_utils;
pub mod index;
pub mod search;

pub use index::{IndexOptions, TantivyIndexStore};
