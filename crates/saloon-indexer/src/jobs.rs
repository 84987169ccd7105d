use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use saloon_core::{Error, Result};

/// A unit of background work, invoked without arguments.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn perform(&self) -> Result<()>;
}

/// Adapts an async closure into a [`JobHandler`].
pub struct FnJob<F>(F);

pub fn job_fn<F, Fut>(f: F) -> FnJob<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnJob(f)
}

#[async_trait]
impl<F, Fut> JobHandler for FnJob<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn perform(&self) -> Result<()> {
        (self.0)().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { elapsed: Duration },
    /// The same job was already running; nothing was done.
    Skipped,
}

struct Registration {
    handler: Arc<dyn JobHandler>,
    in_flight: Arc<AtomicBool>,
}

/// Named job registry. Each job has a queue depth of one: performing a job
/// that is still running elsewhere is skipped, never run concurrently.
#[derive(Default)]
pub struct JobQueue {
    jobs: RwLock<HashMap<String, Registration>>,
}

impl JobQueue {
    pub fn new() -> Self { Self::default() }

    pub fn register<H: JobHandler + 'static>(&self, name: impl Into<String>, handler: H) -> Result<()> {
        let name = name.into();
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&name) {
            return Err(Error::InvalidConfig(format!("job '{}' is already registered", name)));
        }
        debug!(job = %name, "job registered");
        jobs.insert(name, Registration { handler: Arc::new(handler), in_flight: Arc::new(AtomicBool::new(false)) });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.jobs.read().get(name).is_some_and(|r| r.in_flight.load(Ordering::Acquire))
    }

    /// Run `name` to completion on the caller's task. Handler errors are
    /// returned as-is.
    pub async fn perform(&self, name: &str) -> Result<JobOutcome> {
        let (handler, in_flight) = {
            let jobs = self.jobs.read();
            let registration = jobs.get(name).ok_or_else(|| Error::NotFound(format!("job '{}'", name)))?;
            (Arc::clone(&registration.handler), Arc::clone(&registration.in_flight))
        };
        if in_flight.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            debug!(job = name, "job already in flight");
            return Ok(JobOutcome::Skipped);
        }
        let _guard = InFlightGuard(in_flight);

        let started = Instant::now();
        handler.perform().await?;
        Ok(JobOutcome::Completed { elapsed: started.elapsed() })
    }
}

/// Clears the in-flight flag even when the perform future is dropped midway.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
