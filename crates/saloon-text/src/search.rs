use std::collections::BTreeMap;
use std::time::Instant;

use tantivy::collector::{Count, TopDocs};
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::snippet::SnippetGenerator;
use tantivy::TantivyDocument;
use tracing::debug;

use saloon_core::types::{FieldName, SearchHit, SearchRequest, SearchResults};
use saloon_core::{Error, Result};

use crate::index::TantivyIndexStore;

impl TantivyIndexStore {
	/// Query-string search over every text field. Hits keep tantivy's BM25
	/// order; `total_hits` counts all matches, not only the returned page.
	pub(crate) fn run_query(&self, request: &SearchRequest) -> Result<SearchResults> {
		let started = Instant::now();
		let fields = self.fields().text_fields();
		let query_parser = QueryParser::for_index(self.index(), fields.iter().map(|(_, f)| *f).collect());
		let query = query_parser.parse_query(&request.query).map_err(|e| Error::Query(e.to_string()))?;

		let searcher = self.reader().searcher();
		let (top_docs, total_hits) = if request.size == 0 {
			(Vec::new(), searcher.search(&*query, &Count).map_err(search_failed)?)
		} else {
			searcher.search(&*query, &(TopDocs::with_limit(request.size), Count)).map_err(search_failed)?
		};

		let mut generators: Vec<(FieldName, SnippetGenerator)> = Vec::new();
		if request.highlight && !top_docs.is_empty() {
			for (name, field) in fields {
				generators.push((name, SnippetGenerator::create(&searcher, &*query, field).map_err(search_failed)?));
			}
		}

		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, doc_address) in top_docs {
			let doc: TantivyDocument = searcher.doc(doc_address).map_err(search_failed)?;
			let id = doc.get_first(self.fields().id).and_then(|v| v.as_str()).unwrap_or_default().to_string();
			let mut fragments = BTreeMap::new();
			for (name, generator) in &generators {
				let snippet = generator.snippet_from_doc(&doc);
				if !snippet.highlighted().is_empty() { fragments.insert(name.to_string(), snippet.to_html()); }
			}
			hits.push(SearchHit { id, score, fragments });
		}

		let took = started.elapsed();
		debug!(query = %request.query, total_hits, returned = hits.len(), took_ms = took.as_millis() as u64, "search executed");
		Ok(SearchResults { total_hits, hits, took })
	}
}

fn search_failed(e: tantivy::TantivyError) -> Error {
	Error::Operation(format!("search failed: {}", e))
}
