use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

use saloon_core::types::FieldName;
use saloon_core::{Error, Result};

pub const ID_FIELD: &str = "id";
pub const TOKENIZER: &str = "text_with_stopwords";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_text_field(ID_FIELD, STRING | STORED);
	for name in FieldName::ALL {
		let indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
		let options = TextOptions::default().set_indexing_options(indexing).set_stored();
		schema_builder.add_text_field(name.as_str(), options);
	}
	schema_builder.build()
}

/// Tokenizers are not persisted with the index, so this runs on every open.
pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TOKENIZER, tokenizer);
}

/// Field handles resolved once per index.
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
	pub id: Field,
	pub title: Field,
	pub content: Field,
}

impl IndexFields {
	/// Fails when an on-disk index was created with another schema.
	pub fn resolve(schema: &Schema) -> Result<Self> {
		let get = |name: &str| schema.get_field(name).map_err(|e| Error::Storage(format!("index schema has no '{}' field: {}", name, e)));
		Ok(Self { id: get(ID_FIELD)?, title: get(FieldName::Title.as_str())?, content: get(FieldName::Content.as_str())? })
	}

	pub fn text(&self, name: FieldName) -> Field {
		match name { FieldName::Title => self.title, FieldName::Content => self.content }
	}

	pub fn text_fields(&self) -> Vec<(FieldName, Field)> {
		FieldName::ALL.iter().map(|&n| (n, self.text(n))).collect()
	}
}
