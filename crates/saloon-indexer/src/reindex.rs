use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use saloon_core::traits::{ContentStore, DocumentIndex};
use saloon_core::{Error, Result};

use crate::jobs::JobHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub topics: usize,
    pub replies: usize,
    pub documents: usize,
    pub elapsed: Duration,
}

/// Full reindex: one content snapshot in, one index commit out.
///
/// The snapshot is read inside a single content-store transaction; the
/// resulting documents are written as one batch, so a failure anywhere
/// leaves the index at its previous committed state and the next run
/// starts from scratch.
pub struct ReindexJob<S, I> {
    store: Arc<S>,
    index: Arc<I>,
    prune: bool,
}

impl<S, I> ReindexJob<S, I>
where
    S: ContentStore + 'static,
    I: DocumentIndex + 'static,
{
    pub fn new(store: Arc<S>, index: Arc<I>) -> Self {
        Self { store, index, prune: true }
    }

    /// When false, documents whose rows disappeared stay searchable.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        let snapshot = self.store.snapshot().await?;
        let (topics, replies) = (snapshot.topics.len(), snapshot.replies.len());
        let documents = snapshot.documents();

        let index = Arc::clone(&self.index);
        let prune = self.prune;
        let written = tokio::task::spawn_blocking(move || {
            if prune { index.replace_all(&documents) } else { index.upsert_all(&documents) }
        })
        .await
        .map_err(|e| Error::Operation(format!("index writer task failed: {}", e)))??;

        let report = RunReport { topics, replies, documents: written, elapsed: started.elapsed() };
        info!(topics, replies, documents = written, elapsed_ms = report.elapsed.as_millis() as u64, "reindex run committed");
        Ok(report)
    }
}

#[async_trait]
impl<S, I> JobHandler for ReindexJob<S, I>
where
    S: ContentStore + 'static,
    I: DocumentIndex + 'static,
{
    async fn perform(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }
}
