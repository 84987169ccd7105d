//! saloon-indexer
//!
//! Keeps the search index in step with the forum database. A [`JobQueue`]
//! holds named jobs, the [`ReindexJob`] copies one content snapshot into
//! the index, and the [`Scheduler`] runs it at startup and on a fixed
//! interval on its own tokio task until shut down. [`SearchService`] wires
//! the pieces together and answers web-tier queries.
pub mod jobs;
pub mod reindex;
pub mod scheduler;
pub mod search;
pub mod service;

pub use jobs::{job_fn, JobHandler, JobOutcome, JobQueue};
pub use reindex::{ReindexJob, RunReport};
pub use scheduler::{RunCounts, Scheduler, SchedulerHandle, SchedulerState};
pub use search::{SearchFacade, SearchOutcome};
pub use service::SearchService;
