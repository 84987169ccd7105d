use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The index directory cannot be opened or created.
    #[error("Index storage unavailable: {0}")]
    Storage(String),

    /// A single document could not be written to the index.
    #[error("Failed to index document '{id}': {message}")]
    Index { id: String, message: String },

    /// The query string was rejected by the query parser.
    #[error("Invalid search query: {0}")]
    Query(String),

    /// Reading the content snapshot failed.
    #[error("Content store read failed: {0}")]
    ContentStore(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn index(id: impl Into<String>, message: impl ToString) -> Self {
        Self::Index { id: id.into(), message: message.to_string() }
    }

    /// Errors that end a reindex run but leave the process healthy.
    pub fn aborts_run(&self) -> bool {
        matches!(self, Self::Index { .. } | Self::ContentStore(_) | Self::Operation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
