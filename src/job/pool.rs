//! Bounded worker pool for scan jobs
//!
//! Job triggers are fire-and-forget from the caller's point of view, but each
//! submission still returns a handle. Awaiting it guarantees the job's terminal
//! state has been written to the store.

use crate::job::runner::{JobRunner, RunOutcome};
use crate::ScanError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Runs jobs on tokio tasks, at most `max_concurrent` at a time
#[derive(Debug, Clone)]
pub struct JobPool {
    runner: JobRunner,
    permits: Arc<Semaphore>,
}

impl JobPool {
    pub fn new(runner: JobRunner, max_concurrent: usize) -> Self {
        Self {
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Number of jobs that could start right now
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Schedules one job
    ///
    /// The task waits for a free slot, then runs the job to completion.
    pub fn submit(&self, job_id: i64) -> JoinHandle<Result<RunOutcome, ScanError>> {
        let runner = self.runner.clone();
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| ScanError::WorkerPool(e.to_string()))?;
            runner.run(job_id).await
        })
    }

    /// Runs every job currently queued in the store and waits for all of them
    ///
    /// Per-job errors are returned alongside the job id rather than aborting
    /// the remaining jobs.
    pub async fn drain(&self) -> Result<Vec<(i64, Result<RunOutcome, ScanError>)>, ScanError> {
        let job_ids = self.runner.store().queued_job_ids()?;
        tracing::info!("Draining {} queued job(s)", job_ids.len());

        let handles: Vec<_> = job_ids
            .into_iter()
            .map(|job_id| (job_id, self.submit(job_id)))
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (job_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ScanError::WorkerPool(e.to_string())),
            };
            if let Err(e) = &outcome {
                tracing::error!("Job {} errored: {}", job_id, e);
            }
            results.push((job_id, outcome));
        }

        Ok(results)
    }
}
