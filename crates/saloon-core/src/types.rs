//! Domain types used by the index store, the content store and the scheduler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub type DocumentId = String;

/// Path prefix shared by every document id; ids double as deep links.
pub const TOPIC_LINK_PREFIX: &str = "topics/detail/";

/// Number of hits the web tier asks for.
pub const DEFAULT_SEARCH_SIZE: usize = 100;

/// The fixed set of analyzed text fields a document may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Title,
    Content,
}

impl FieldName {
    pub const ALL: [FieldName; 2] = [FieldName::Title, FieldName::Content];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The flattened, search-facing form of a topic or a reply.
///
/// - `id`: unique key in the index and deep link back to the forum page
///   (`topics/detail/<topic>` or `topics/detail/<topic>#<reply>`)
/// - `fields`: named text payloads; absent fields are simply not indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: BTreeMap<FieldName, String>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>) -> Self {
        Self { id: id.into(), fields: BTreeMap::new() }
    }

    pub fn with_field(mut self, name: FieldName, value: impl Into<String>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    pub fn field(&self, name: FieldName) -> Option<&str> {
        self.fields.get(&name).map(String::as_str)
    }

    pub fn from_topic(topic: &Topic) -> Self {
        Self::new(format!("{TOPIC_LINK_PREFIX}{}", topic.id))
            .with_field(FieldName::Title, topic.title.clone())
            .with_field(FieldName::Content, topic.content.clone())
    }

    pub fn from_reply(reply: &Reply) -> Self {
        Self::new(format!("{TOPIC_LINK_PREFIX}{}#{}", reply.topic_id, reply.id))
            .with_field(FieldName::Content, reply.content.clone())
    }

    /// Ids end up in URLs, so they must be non-empty and free of whitespace
    /// and control characters.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::index(&self.id, "document id is empty"));
        }
        if self.id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::index(&self.id, "document id contains whitespace or control characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub topic_id: String,
    pub content: String,
}

/// Every indexable row, read inside one content-store transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub topics: Vec<Topic>,
    pub replies: Vec<Reply>,
}

impl ContentSnapshot {
    pub fn len(&self) -> usize {
        self.topics.len() + self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.replies.is_empty()
    }

    /// Topics first, then replies, each in store enumeration order.
    pub fn documents(&self) -> Vec<Document> {
        self.topics
            .iter()
            .map(Document::from_topic)
            .chain(self.replies.iter().map(Document::from_reply))
            .collect()
    }
}

/// A free-text query as issued by the web tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub size: usize,
    pub highlight: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), size: DEFAULT_SEARCH_SIZE, highlight: true }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

/// One matching document. `fragments` maps a field name to an HTML excerpt
/// with the matched terms wrapped in `<b>`; it is empty when highlighting
/// was not requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocumentId,
    pub score: f32,
    pub fragments: BTreeMap<String, String>,
}

/// Hits in engine relevance order plus the total number of matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
    pub took: Duration,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.id.as_str()).collect()
    }
}
