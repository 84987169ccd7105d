use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContentSnapshot, Document, SearchRequest, SearchResults};

/// Write and query surface of the persistent inverted index.
///
/// Writes are synchronous: once a call returns `Ok` the documents are
/// committed and visible to `search`.
pub trait DocumentIndex: Send + Sync {
    /// Index one document, replacing any document with the same id.
    fn upsert(&self, doc: &Document) -> Result<()>;

    /// Upsert a batch in a single commit. The first failure rolls the whole
    /// batch back and is returned.
    fn upsert_all(&self, docs: &[Document]) -> Result<usize>;

    /// Like `upsert_all`, but documents missing from `docs` are dropped in
    /// the same commit.
    fn replace_all(&self, docs: &[Document]) -> Result<usize>;

    fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    fn num_docs(&self) -> Result<u64>;
}

/// Read-only view of the forum database.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All indexable topics and replies, read in one consistent snapshot.
    async fn snapshot(&self) -> Result<ContentSnapshot>;
}
