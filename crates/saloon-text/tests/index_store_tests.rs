use saloon_core::traits::DocumentIndex;
use saloon_core::types::{Document, FieldName, SearchRequest};
use saloon_core::Error;
use saloon_text::{IndexOptions, TantivyIndexStore};
use tempfile::TempDir;

fn topic(id: &str, title: &str, content: &str) -> Document {
    Document::new(format!("topics/detail/{}", id))
        .with_field(FieldName::Title, title)
        .with_field(FieldName::Content, content)
}

fn reply(topic_id: &str, id: &str, content: &str) -> Document {
    Document::new(format!("topics/detail/{}#{}", topic_id, id)).with_field(FieldName::Content, content)
}

fn hits(store: &TantivyIndexStore, q: &str) -> Vec<String> {
    store.search(&SearchRequest::new(q)).expect("search").hits.into_iter().map(|h| h.id).collect()
}

#[test]
fn forum_scenario_finds_topics_and_replies() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert_all(&[topic("t1", "Hello World", "first post"), reply("t1", "r1", "nice topic")]).expect("index");

    assert_eq!(hits(&store, "hello"), ["topics/detail/t1"]);
    assert_eq!(hits(&store, "nice"), ["topics/detail/t1#r1"]);
    assert!(hits(&store, "nonexistent").is_empty());
}

#[test]
fn upserting_same_id_keeps_only_latest_fields() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert(&topic("t1", "draft title", "old body")).expect("first");
    store.upsert(&topic("t1", "final title", "new body")).expect("second");

    assert_eq!(store.num_docs().expect("count"), 1);
    assert!(hits(&store, "draft").is_empty());
    assert_eq!(hits(&store, "final"), ["topics/detail/t1"]);
    assert_eq!(hits(&store, "title"), ["topics/detail/t1"], "no duplicate hits for one id");
}

#[test]
fn duplicate_ids_within_a_batch_collapse_to_the_last() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert_all(&[topic("t1", "alpha", "x"), topic("t1", "bravo", "y")]).expect("batch");
    assert_eq!(store.ids().expect("ids"), ["topics/detail/t1"]);
    assert_eq!(hits(&store, "bravo"), ["topics/detail/t1"]);
}

#[test]
fn failed_batch_leaves_last_committed_state() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert_all(&[topic("t1", "Hello World", "first post")]).expect("seed");

    let batch = [topic("t2", "second", "body"), topic("bad id", "broken", "body"), topic("t3", "third", "body")];
    let err = store.upsert_all(&batch).unwrap_err();
    assert!(matches!(err, Error::Index { ref id, .. } if id == "topics/detail/bad id"));

    assert_eq!(store.ids().expect("ids"), ["topics/detail/t1"]);
    assert!(hits(&store, "second").is_empty(), "documents staged before the failure are rolled back");

    // the writer is still usable after a rollback
    store.upsert_all(&[topic("t2", "second", "body")]).expect("retry");
    assert_eq!(store.num_docs().expect("count"), 2);
}

#[test]
fn replace_all_prunes_documents_missing_from_batch() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert_all(&[topic("t1", "one", "a"), topic("t2", "two", "b"), reply("t2", "r1", "c")]).expect("seed");

    store.replace_all(&[topic("t1", "one", "a"), reply("t1", "r2", "d")]).expect("replace");
    assert_eq!(store.ids().expect("ids"), ["topics/detail/t1", "topics/detail/t1#r2"]);
}

#[test]
fn upsert_all_keeps_documents_missing_from_batch() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert_all(&[topic("t1", "one", "a")]).expect("seed");
    store.upsert_all(&[topic("t2", "two", "b")]).expect("second");
    assert_eq!(store.num_docs().expect("count"), 2);
}

#[test]
fn malformed_query_is_a_query_error() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert(&topic("t1", "Hello", "World")).expect("index");
    let err = store.search(&SearchRequest::new("title:(hello")).unwrap_err();
    assert!(matches!(err, Error::Query(_)), "got {:?}", err);
}

#[test]
fn field_prefixed_queries_are_supported() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert_all(&[topic("t1", "rust", "gardening"), topic("t2", "gardening", "rust")]).expect("index");
    assert_eq!(hits(&store, "title:rust"), ["topics/detail/t1"]);
}

#[test]
fn highlight_returns_fragments_only_for_matching_fields() {
    let store = TantivyIndexStore::in_memory().expect("store");
    store.upsert(&topic("t1", "Hello World", "first post")).expect("index");

    let results = store.search(&SearchRequest::new("hello")).expect("search");
    let hit = &results.hits[0];
    assert_eq!(hit.fragments.get("title").map(String::as_str), Some("<b>Hello</b> World"));
    assert!(!hit.fragments.contains_key("content"));

    let plain = store.search(&SearchRequest::new("hello").with_highlight(false)).expect("search");
    assert!(plain.hits[0].fragments.is_empty());
}

#[test]
fn size_bounds_hits_but_not_total() {
    let store = TantivyIndexStore::in_memory().expect("store");
    let docs: Vec<Document> = (0..5).map(|i| topic(&format!("t{}", i), "common", "words")).collect();
    store.upsert_all(&docs).expect("index");

    let page = store.search(&SearchRequest::new("common").with_size(2)).expect("search");
    assert_eq!(page.hits.len(), 2);
    assert_eq!(page.total_hits, 5);

    let none = store.search(&SearchRequest::new("common").with_size(0)).expect("search");
    assert!(none.is_empty());
    assert_eq!(none.total_hits, 5);
}

#[test]
fn reopening_on_disk_index_keeps_documents() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("saloon.search.index");
    {
        let store = TantivyIndexStore::open(&path, &IndexOptions::default()).expect("create");
        store.upsert(&topic("t1", "Hello World", "first post")).expect("index");
    }
    let store = TantivyIndexStore::open(&path, &IndexOptions::default()).expect("reopen");
    assert_eq!(store.path(), Some(path.as_path()));
    assert_eq!(hits(&store, "hello"), ["topics/detail/t1"]);
}

#[test]
fn rebuild_on_start_discards_existing_index() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("idx");
    {
        let store = TantivyIndexStore::open(&path, &IndexOptions::default()).expect("create");
        store.upsert(&topic("t1", "Hello", "World")).expect("index");
    }
    let options = IndexOptions { rebuild_on_start: true, ..IndexOptions::default() };
    let store = TantivyIndexStore::open(&path, &options).expect("rebuild");
    assert_eq!(store.num_docs().expect("count"), 0);
}

#[test]
fn corrupt_index_is_a_storage_error() {
    let tmp = TempDir::new().expect("tmp");
    std::fs::write(tmp.path().join("meta.json"), "not json").expect("write");
    let err = TantivyIndexStore::open(tmp.path(), &IndexOptions::default()).err().expect("must fail");
    assert!(matches!(err, Error::Storage(_)), "got {:?}", err);
}

#[test]
fn second_writer_on_same_directory_is_refused() {
    let tmp = TempDir::new().expect("tmp");
    let _first = TantivyIndexStore::open(tmp.path(), &IndexOptions::default()).expect("first");
    let err = TantivyIndexStore::open(tmp.path(), &IndexOptions::default()).err().expect("must fail");
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn read_only_handle_searches_next_to_the_writer() {
    let tmp = TempDir::new().expect("tmp");
    let writer = TantivyIndexStore::open(tmp.path(), &IndexOptions::default()).expect("writer");
    writer.upsert(&topic("t1", "Hello World", "first post")).expect("upsert");

    let reader = TantivyIndexStore::open_read_only(tmp.path()).expect("read-only");
    assert_eq!(hits(&reader, "hello"), ["topics/detail/t1"]);
    assert!(matches!(reader.upsert(&topic("t2", "x", "y")), Err(Error::Operation(_))));
}

#[test]
fn read_only_open_of_missing_index_is_a_storage_error() {
    let tmp = TempDir::new().expect("tmp");
    let err = TantivyIndexStore::open_read_only(tmp.path().join("absent")).err().expect("must fail");
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn searches_during_a_batch_see_the_last_commit_only() {
    const BATCH: usize = 5_000;
    let store = std::sync::Arc::new(TantivyIndexStore::in_memory().expect("store"));
    store.upsert(&topic("t0", "Hello World", "first post")).expect("seed");

    let mut batch = vec![topic("t0", "Hello World", "first post")];
    batch.extend((1..=BATCH).map(|i| reply("t0", &format!("r{}", i), "fresh reply")));
    let writer = {
        let store = std::sync::Arc::clone(&store);
        std::thread::spawn(move || store.replace_all(&batch))
    };

    while !writer.is_finished() {
        let fresh = store.search(&SearchRequest::new("fresh").with_size(1)).expect("search during batch");
        assert!(fresh.total_hits == 0 || fresh.total_hits == BATCH, "partial batch visible: {}", fresh.total_hits);
        assert_eq!(hits(&store, "hello"), ["topics/detail/t0"]);
    }
    assert_eq!(writer.join().expect("writer thread").expect("batch"), BATCH + 1);

    let fresh = store.search(&SearchRequest::new("fresh").with_size(0)).expect("search after commit");
    assert_eq!(fresh.total_hits, BATCH);
}

#[test]
fn concurrent_writers_never_leave_stale_documents_behind() {
    let store = std::sync::Arc::new(TantivyIndexStore::in_memory().expect("store"));
    let keep = topic("t0", "Hello World", "first post");

    let upserter = {
        let store = std::sync::Arc::clone(&store);
        std::thread::spawn(move || {
            for i in 1..=50 {
                store.upsert_all(&[topic(&format!("x{}", i), "extra", "body")]).expect("upsert");
            }
        })
    };
    for _ in 0..50 {
        store.replace_all(std::slice::from_ref(&keep)).expect("replace");
        assert!(store.ids().expect("ids").contains(&"topics/detail/t0".to_string()));
    }
    upserter.join().expect("upserter");

    store.replace_all(std::slice::from_ref(&keep)).expect("final replace");
    assert_eq!(store.ids().expect("ids"), ["topics/detail/t0"]);
}
