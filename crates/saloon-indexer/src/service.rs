use std::sync::Arc;

use tracing::info;

use saloon_core::config::Settings;
use saloon_core::traits::ContentStore;
use saloon_core::Result;
use saloon_text::{IndexOptions, TantivyIndexStore};

use crate::jobs::JobQueue;
use crate::reindex::ReindexJob;
use crate::scheduler::{Scheduler, SchedulerHandle};
use crate::search::{SearchFacade, SearchOutcome};

/// The running search subsystem: one index, one scheduler, one facade.
pub struct SearchService {
    index: Arc<TantivyIndexStore>,
    queue: Arc<JobQueue>,
    facade: SearchFacade<TantivyIndexStore>,
    scheduler: SchedulerHandle,
}

impl SearchService {
    /// Open the on-disk index and start indexing. Failing to open the index
    /// is fatal: the caller should not serve without search.
    pub fn start<S: ContentStore + 'static>(settings: &Settings, store: Arc<S>) -> Result<Self> {
        settings.validate()?;
        let path = settings.index.resolved_path();
        let index = TantivyIndexStore::open(&path, &IndexOptions::from(&settings.index))?;
        Self::start_with_index(settings, store, Arc::new(index))
    }

    pub fn start_with_index<S: ContentStore + 'static>(
        settings: &Settings,
        store: Arc<S>,
        index: Arc<TantivyIndexStore>,
    ) -> Result<Self> {
        let queue = Arc::new(JobQueue::new());
        let job = ReindexJob::new(store, Arc::clone(&index)).with_prune(settings.index.prune_stale);
        queue.register(settings.scheduler.job_name.clone(), job)?;

        let scheduler = Scheduler::new(Arc::clone(&queue), settings.scheduler.job_name.clone(), settings.scheduler.interval()).spawn()?;
        let facade = SearchFacade::new(Arc::clone(&index))
            .with_limit(settings.search.limit)
            .with_highlight(settings.search.highlight);
        info!(job = %settings.scheduler.job_name, "search service started");
        Ok(Self { index, queue, facade, scheduler })
    }

    pub fn search(&self, text: &str) -> Result<SearchOutcome> {
        self.facade.search(text)
    }

    pub fn index(&self) -> &Arc<TantivyIndexStore> {
        &self.index
    }

    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Request a reindex outside the regular cadence.
    pub fn reindex_now(&self) -> bool {
        self.scheduler.trigger()
    }

    pub async fn shutdown(self) -> Result<()> {
        self.scheduler.shutdown().await?;
        info!("search service stopped");
        Ok(())
    }
}
