//! Bounded worker pool for provider evaluation.
//!
//! Providers are synchronous and I/O-bound, so each job runs on tokio's
//! blocking pool:
//! - a `Semaphore` caps how many jobs run at once
//! - an optional per-job timeout turns a stalled provider into `SourceUnavailable`;
//!   the stalled thread keeps its slot and jobs still queued are abandoned
//! - a `CancelHandle` aborts the whole run
//!
//! Results come back in submission order regardless of completion order.

use crate::types::SpecError;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type JobFn<T> = Box<dyn FnOnce() -> Result<T, SpecError> + Send>;

/// Work item accepted by the provider pool.
pub struct PoolJob<T> {
    pub label: String,
    work: JobFn<T>,
}

impl<T> PoolJob<T> {
    pub fn new<F>(label: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Result<T, SpecError> + Send + 'static,
    {
        Self {
            label: label.into(),
            work: Box::new(work),
        }
    }
}

impl<T> fmt::Debug for PoolJob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolJob").field("label", &self.label).finish()
    }
}

/// Runtime stats for one pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Per-job results, in submission order.
#[derive(Debug)]
pub struct PoolOutput<T> {
    pub results: Vec<Result<T, SpecError>>,
    pub stats: PoolStats,
}

/// Cooperative cancellation shared between a caller and a running pool.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once `cancel` has been called (immediately if it already was).
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking-job pool with bounded concurrency.
pub struct ProviderPool {
    runtime: Option<Runtime>,
    workers: usize,
    timeout: Option<Duration>,
    cancel: Option<CancelHandle>,
}

impl ProviderPool {
    /// Create a pool running at most `worker_count` jobs at once.
    pub fn new(worker_count: usize, timeout: Option<Duration>) -> Result<Self, SpecError> {
        let workers = worker_count.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()
            .map_err(SpecError::Io)?;

        Ok(Self {
            runtime: Some(runtime),
            workers,
            timeout,
            cancel: None,
        })
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job and wait for all of them.
    ///
    /// Individual failures are reported per job. The call itself fails only
    /// when the run is cancelled or a task panics.
    pub fn run<T: Send + 'static>(&self, jobs: Vec<PoolJob<T>>) -> Result<PoolOutput<T>, SpecError> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| SpecError::Config("provider pool is already shut down".to_string()))?;

        if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            return Err(cancelled_error());
        }

        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let timeout = self.timeout;
        let cancel = self.cancel.clone();

        let results = runtime.block_on(async move {
            let mut set = JoinSet::new();
            for (index, job) in jobs.into_iter().enumerate() {
                let semaphore = Arc::clone(&semaphore);
                set.spawn(async move { (index, run_job(job, semaphore, timeout).await) });
            }

            let mut slots: Vec<Option<Result<T, SpecError>>> = (0..total).map(|_| None).collect();
            let collect = async {
                while let Some(joined) = set.join_next().await {
                    let (index, result) = joined.map_err(map_join_error)?;
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(result);
                    }
                }
                Ok::<(), SpecError>(())
            };

            match cancel {
                Some(cancel) => {
                    tokio::select! {
                        collected = collect => collected?,
                        _ = cancel.cancelled() => return Err(cancelled_error()),
                    }
                }
                None => collect.await?,
            }

            Ok::<_, SpecError>(slots
                .into_iter()
                .map(|slot| {
                    slot.unwrap_or_else(|| {
                        Err(SpecError::source_unavailable("provider pool", "job did not report"))
                    })
                })
                .collect::<Vec<_>>())
        })?;

        let failed = results.iter().filter(|r| r.is_err()).count();
        Ok(PoolOutput {
            stats: PoolStats {
                workers: self.workers,
                submitted: total,
                succeeded: total - failed,
                failed,
            },
            results,
        })
    }
}

impl Drop for ProviderPool {
    fn drop(&mut self) {
        // A timed-out provider may still be running on a blocking thread;
        // don't make the caller wait for it.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn run_job<T: Send + 'static>(
    job: PoolJob<T>,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
) -> Result<T, SpecError> {
    let PoolJob { label, work } = job;
    let permit = semaphore.clone().acquire_owned().await.map_err(|_| {
        SpecError::source_unavailable(label.clone(), "abandoned: worker pool closed")
    })?;

    tracing::debug!(job = %label, "evaluating provider");
    // Held until the work returns, even past a timeout.
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    });
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(job = %label, ?limit, "provider timed out");
                // The stalled thread keeps its permit; fail queued jobs instead.
                semaphore.close();
                return Err(SpecError::source_unavailable(
                    label,
                    format!("timed out after {:?}", limit),
                ));
            }
        },
        None => handle.await,
    };

    joined.map_err(|e| SpecError::source_unavailable(label, format!("provider task failed: {}", e)))?
}

fn cancelled_error() -> SpecError {
    SpecError::source_unavailable("assembly", "cancelled")
}

fn map_join_error(error: tokio::task::JoinError) -> SpecError {
    SpecError::source_unavailable("provider pool", format!("task failed: {}", error))
}
