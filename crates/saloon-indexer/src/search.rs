use std::sync::Arc;

use serde::Serialize;

use saloon_core::traits::DocumentIndex;
use saloon_core::types::{SearchRequest, SearchResults, DEFAULT_SEARCH_SIZE};
use saloon_core::{Error, Result};

/// What the search page should render.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// No query given: show the empty search form.
    Blank,
    /// The query did not parse; the message is safe to show to the user.
    Invalid(String),
    Results(SearchResults),
}

/// Web-tier entry point: turns the raw `query` parameter into a search.
pub struct SearchFacade<I> {
    index: Arc<I>,
    limit: usize,
    highlight: bool,
}

impl<I: DocumentIndex> SearchFacade<I> {
    pub fn new(index: Arc<I>) -> Self {
        Self { index, limit: DEFAULT_SEARCH_SIZE, highlight: true }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Empty or whitespace-only input never reaches the index. Query syntax
    /// errors become [`SearchOutcome::Invalid`]; anything else propagates.
    pub fn search(&self, text: &str) -> Result<SearchOutcome> {
        if text.trim().is_empty() {
            return Ok(SearchOutcome::Blank);
        }
        let request = SearchRequest::new(text).with_size(self.limit).with_highlight(self.highlight);
        match self.index.search(&request) {
            Ok(results) => Ok(SearchOutcome::Results(results)),
            Err(Error::Query(message)) => Ok(SearchOutcome::Invalid(message)),
            Err(e) => Err(e),
        }
    }
}
