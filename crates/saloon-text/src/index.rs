use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use parking_lot::Mutex;
use tantivy::collector::DocSetCollector;
use tantivy::directory::MmapDirectory;
use tantivy::query::AllQuery;
use tantivy::schema::Value;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info, warn};

use saloon_core::config::IndexSettings;
use saloon_core::traits::DocumentIndex;
use saloon_core::types::{Document, SearchRequest, SearchResults};
use saloon_core::{Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer, IndexFields};

#[derive(Debug, Clone)]
pub struct IndexOptions {
	/// Remove whatever is on disk before opening.
	pub rebuild_on_start: bool,
	pub writer_memory_bytes: usize,
}

impl Default for IndexOptions {
	fn default() -> Self { Self { rebuild_on_start: false, writer_memory_bytes: 50_000_000 } }
}

impl From<&IndexSettings> for IndexOptions {
	fn from(s: &IndexSettings) -> Self { Self { rebuild_on_start: s.rebuild_on_start, writer_memory_bytes: s.writer_memory_bytes } }
}

/// Process-lifetime handle on the search index.
///
/// Holds the only `IndexWriter` behind a mutex, so writes are serialized,
/// while searches go through a reader that is reloaded after each commit
/// and never waits on the writer.
pub struct TantivyIndexStore {
	index: Index,
	reader: IndexReader,
	/// `None` for read-only handles.
	writer: Option<Mutex<IndexWriter>>,
	fields: IndexFields,
	path: Option<PathBuf>,
}

impl TantivyIndexStore {
	/// Open the index in `index_dir`, creating it (and the directory) if absent.
	pub fn open(index_dir: impl AsRef<Path>, options: &IndexOptions) -> Result<Self> {
		let index_dir = index_dir.as_ref();
		if options.rebuild_on_start && index_dir.exists() {
			info!(path = %index_dir.display(), "removing existing search index");
			std::fs::remove_dir_all(index_dir).map_err(|e| storage(index_dir, e))?;
		}
		std::fs::create_dir_all(index_dir).map_err(|e| storage(index_dir, e))?;
		let dir = MmapDirectory::open(index_dir).map_err(|e| storage(index_dir, e))?;
		let existed = Index::exists(&dir).map_err(|e| storage(index_dir, e))?;
		let index = Index::open_or_create(dir, build_schema()).map_err(|e| storage(index_dir, e))?;
		info!(path = %index_dir.display(), created = !existed, "search index ready");
		Self::from_index(index, options, Some(index_dir.to_path_buf()))
	}

	/// Open an existing index for searching only. Takes no writer lock, so it
	/// can sit next to a running indexer; writes fail with `Operation`.
	pub fn open_read_only(index_dir: impl AsRef<Path>) -> Result<Self> {
		let index_dir = index_dir.as_ref();
		let index = Index::open_in_dir(index_dir).map_err(|e| storage(index_dir, e))?;
		register_tokenizer(&index);
		let fields = IndexFields::resolve(&index.schema())?;
		let reader = build_reader(&index)?;
		Ok(Self { index, reader, writer: None, fields, path: Some(index_dir.to_path_buf()) })
	}

	/// RAM-only index, gone when dropped.
	pub fn in_memory() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()), &IndexOptions::default(), None)
	}

	fn from_index(index: Index, options: &IndexOptions, path: Option<PathBuf>) -> Result<Self> {
		register_tokenizer(&index);
		let fields = IndexFields::resolve(&index.schema())?;
		let reader = build_reader(&index)?;
		let writer = index.writer(options.writer_memory_bytes)
			.map_err(|e| Error::Storage(format!("cannot acquire index writer: {}", e)))?;
		Ok(Self { index, reader, writer: Some(Mutex::new(writer)), fields, path })
	}

	pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

	pub(crate) fn index(&self) -> &Index { &self.index }
	pub(crate) fn reader(&self) -> &IndexReader { &self.reader }
	pub(crate) fn fields(&self) -> &IndexFields { &self.fields }

	/// Every document id currently visible to searches, sorted.
	pub fn ids(&self) -> Result<Vec<String>> {
		let searcher = self.reader.searcher();
		let addrs = searcher.search(&AllQuery, &DocSetCollector).map_err(|e| Error::Operation(format!("listing documents failed: {}", e)))?;
		let mut ids = Vec::with_capacity(addrs.len());
		for addr in addrs {
			let doc: TantivyDocument = searcher.doc(addr).map_err(|e| Error::Operation(format!("reading document failed: {}", e)))?;
			if let Some(id) = doc.get_first(self.fields.id).and_then(|v| v.as_str()) { ids.push(id.to_string()); }
		}
		ids.sort();
		Ok(ids)
	}

	fn to_tantivy(&self, doc: &Document) -> Result<TantivyDocument> {
		doc.validate()?;
		let mut out = TantivyDocument::default();
		out.add_text(self.fields.id, &doc.id);
		for (name, value) in &doc.fields { out.add_text(self.fields.text(*name), value); }
		Ok(out)
	}

	/// Stage every document and commit once. Any failure rolls back
	/// everything staged since the last commit.
	fn write_batch(&self, docs: &[Document], prune: bool) -> Result<usize> {
		let started = Instant::now();
		let mut writer = self.writer.as_ref()
			.ok_or_else(|| Error::Operation("search index is open read-only".into()))?
			.lock();
		let stale: Vec<String> = if prune {
			let keep: HashSet<&str> = docs.iter().map(|d| d.id.as_str()).collect();
			self.ids()?.into_iter().filter(|id| !keep.contains(id.as_str())).collect()
		} else { Vec::new() };

		if let Err(err) = self.stage(&writer, &stale, docs) {
			rollback(&mut writer);
			return Err(err);
		}
		if let Err(e) = writer.commit() {
			rollback(&mut writer);
			return Err(Error::Operation(format!("index commit failed: {}", e)));
		}
		// Reload under the lock so the next batch computes `stale` from this commit.
		self.reader.reload().map_err(|e| Error::Operation(format!("index reader reload failed: {}", e)))?;
		drop(writer);
		debug!(documents = docs.len(), pruned = stale.len(), elapsed_ms = started.elapsed().as_millis() as u64, "index batch committed");
		Ok(docs.len())
	}

	fn stage(&self, writer: &IndexWriter, stale: &[String], docs: &[Document]) -> Result<()> {
		for id in stale { writer.delete_term(Term::from_field_text(self.fields.id, id)); }
		for doc in docs {
			let tdoc = self.to_tantivy(doc)?;
			writer.delete_term(Term::from_field_text(self.fields.id, &doc.id));
			writer.add_document(tdoc).map_err(|e| Error::index(&doc.id, e))?;
		}
		Ok(())
	}
}

fn build_reader(index: &Index) -> Result<IndexReader> {
	index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()
		.map_err(|e| Error::Storage(format!("cannot create index reader: {}", e)))
}

fn rollback(writer: &mut IndexWriter) {
	if let Err(e) = writer.rollback() { warn!(error = %e, "index rollback failed"); }
}

fn storage(path: &Path, e: impl std::fmt::Display) -> Error {
	Error::Storage(format!("{}: {}", path.display(), e))
}

impl DocumentIndex for TantivyIndexStore {
	fn upsert(&self, doc: &Document) -> Result<()> {
		self.write_batch(std::slice::from_ref(doc), false).map(|_| ())
	}

	fn upsert_all(&self, docs: &[Document]) -> Result<usize> {
		self.write_batch(docs, false)
	}

	fn replace_all(&self, docs: &[Document]) -> Result<usize> {
		self.write_batch(docs, true)
	}

	fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
		self.run_query(request)
	}

	fn num_docs(&self) -> Result<u64> {
		Ok(self.reader.searcher().num_docs())
	}
}
