use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use saloon_core::traits::DocumentIndex;
use saloon_core::types::{Document, FieldName, SearchRequest, SearchResults};
use saloon_core::{Error, Result};
use saloon_indexer::{SearchFacade, SearchOutcome};
use saloon_text::TantivyIndexStore;

/// Records what reaches the index and answers with a canned result.
#[derive(Default)]
struct SpyIndex {
    calls: AtomicUsize,
    last_size: AtomicUsize,
    unavailable: bool,
}

impl DocumentIndex for SpyIndex {
    fn upsert(&self, _doc: &Document) -> Result<()> { Ok(()) }
    fn upsert_all(&self, docs: &[Document]) -> Result<usize> { Ok(docs.len()) }
    fn replace_all(&self, docs: &[Document]) -> Result<usize> { Ok(docs.len()) }

    fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_size.store(request.size, Ordering::SeqCst);
        if self.unavailable {
            return Err(Error::Storage("index directory vanished".into()));
        }
        Ok(SearchResults::default())
    }

    fn num_docs(&self) -> Result<u64> { Ok(0) }
}

#[test]
fn blank_queries_never_reach_the_index() {
    let spy = Arc::new(SpyIndex::default());
    let facade = SearchFacade::new(Arc::clone(&spy));
    for text in ["", "   ", "\t\n"] {
        assert!(matches!(facade.search(text).expect("search"), SearchOutcome::Blank));
    }
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn limit_is_passed_through() {
    let spy = Arc::new(SpyIndex::default());
    let facade = SearchFacade::new(Arc::clone(&spy)).with_limit(7);
    assert!(matches!(facade.search("hello").expect("search"), SearchOutcome::Results(_)));
    assert_eq!(spy.last_size.load(Ordering::SeqCst), 7);
}

#[test]
fn engine_errors_propagate() {
    let spy = Arc::new(SpyIndex { unavailable: true, ..SpyIndex::default() });
    let err = SearchFacade::new(spy).search("hello").unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn malformed_query_is_reported_as_invalid() {
    let index = Arc::new(TantivyIndexStore::in_memory().expect("index"));
    let outcome = SearchFacade::new(index).search("title:(hello").expect("search");
    assert!(matches!(outcome, SearchOutcome::Invalid(ref m) if !m.is_empty()));
}

#[test]
fn no_matches_is_an_empty_result() {
    let index = Arc::new(TantivyIndexStore::in_memory().expect("index"));
    index
        .upsert(&Document::new("topics/detail/t1").with_field(FieldName::Title, "Hello World"))
        .expect("upsert");
    let facade = SearchFacade::new(index);

    match facade.search("nonexistent").expect("search") {
        SearchOutcome::Results(results) => {
            assert!(results.is_empty());
            assert_eq!(results.total_hits, 0);
        }
        other => panic!("expected results, got {other:?}"),
    }
    match facade.search("hello").expect("search") {
        SearchOutcome::Results(results) => {
            assert_eq!(results.ids(), ["topics/detail/t1"]);
            assert!(results.hits[0].fragments["title"].contains("<b>Hello</b>"));
        }
        other => panic!("expected results, got {other:?}"),
    }
}

#[test]
fn outcome_serializes_with_a_kind_tag() {
    let json = serde_json::to_value(SearchOutcome::Invalid("bad query".into())).expect("json");
    assert_eq!(json, serde_json::json!({ "kind": "invalid", "value": "bad query" }));
    let json = serde_json::to_value(SearchOutcome::Blank).expect("json");
    assert_eq!(json, serde_json::json!({ "kind": "blank" }));
}
