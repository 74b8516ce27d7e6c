//! Job runner - the scan job state machine
//!
//! One call to [`JobRunner::run`] takes one job from `QUEUED` to a terminal
//! state:
//!
//! 1. Load the job; unknown ids and jobs not in `QUEUED` are skipped
//! 2. No target URL: `QUEUED -> FAILED` (`WEBSITE_NOT_FOUND`), no network I/O
//! 3. Claim the job with a guarded `QUEUED -> RUNNING`
//! 4. Run the full scan
//!    - success: `RUNNING -> COMPLETED` with score, risk and issues
//!    - failure: run the partial probe
//!      - probe ok: `RUNNING -> COMPLETED` (partial, score 0, original error kept)
//!      - probe failed: `RUNNING -> FAILED` with the original error
//!
//! This is the only place scan failures are caught.

use crate::config::Config;
use crate::job::summary::{FullSummary, PartialSummary};
use crate::probe::{PartialProbe, PartialProbeResult};
use crate::scan::{ScanResult, Scanner};
use crate::state::{JobStatus, ScanMode};
use crate::storage::{JobStore, JobUpdate, StorageError};
use crate::ScanError;
use async_trait::async_trait;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Failure reason for jobs whose website record is gone
pub const WEBSITE_NOT_FOUND: &str = "WEBSITE_NOT_FOUND";

/// Runs a full scan of one target
#[async_trait]
pub trait ScanEngine: Send + Sync {
    async fn scan(&self, target: &str) -> Result<ScanResult, ScanError>;
}

/// Runs the fallback probe of one target
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &str) -> Result<PartialProbeResult, ScanError>;
}

#[async_trait]
impl ScanEngine for Scanner {
    async fn scan(&self, target: &str) -> Result<ScanResult, ScanError> {
        Scanner::scan(self, target).await
    }
}

#[async_trait]
impl Prober for PartialProbe {
    async fn probe(&self, target: &str) -> Result<PartialProbeResult, ScanError> {
        PartialProbe::probe(self, target).await
    }
}

/// Why a job was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No job with this id exists
    NotFound,
    /// The job was already past `QUEUED` when loaded
    NotQueued(JobStatus),
    /// Another invocation changed the job between load and update
    LostRace,
}

/// What one runner invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped(SkipReason),
    Completed { mode: ScanMode, score: u8 },
    Failed { reason: String },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(SkipReason::NotFound) => write!(f, "skipped (job not found)"),
            Self::Skipped(SkipReason::NotQueued(status)) => {
                write!(f, "skipped (already {})", status)
            }
            Self::Skipped(SkipReason::LostRace) => write!(f, "skipped (claimed elsewhere)"),
            Self::Completed { mode, score } => write!(f, "completed ({}, score {})", mode, score),
            Self::Failed { reason } => write!(f, "failed ({})", reason),
        }
    }
}

/// Executes scan jobs against a job store
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    engine: Arc<dyn ScanEngine>,
    prober: Arc<dyn Prober>,
}

impl fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRunner").finish_non_exhaustive()
    }
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn JobStore>,
        engine: Arc<dyn ScanEngine>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self {
            store,
            engine,
            prober,
        }
    }

    /// Builds a runner with the production scanner and probe
    pub fn from_config(config: &Config, store: Arc<dyn JobStore>) -> Result<Self, ScanError> {
        let scanner = Scanner::new(&config.scanner)?;
        let probe = PartialProbe::new(&config.probe, config.scanner.user_agent())?;
        Ok(Self::new(store, Arc::new(scanner), Arc::new(probe)))
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Runs one job to a terminal state
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome)` - what happened to the job
    /// * `Err(ScanError::Storage)` - the job store could not be read or written
    pub async fn run(&self, job_id: i64) -> Result<RunOutcome, ScanError> {
        let Some(job) = self.store.load_job(job_id)? else {
            tracing::debug!("Job {} not found, skipping", job_id);
            return Ok(RunOutcome::Skipped(SkipReason::NotFound));
        };

        if job.status != JobStatus::Queued {
            tracing::debug!("Job {} is {}, skipping", job_id, job.status);
            return Ok(RunOutcome::Skipped(SkipReason::NotQueued(job.status)));
        }

        let target = match job.target_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => return self.fail_unresolved(job_id),
        };

        let claim = JobUpdate {
            started_at: Some(Utc::now()),
            ..JobUpdate::default()
        };
        if !self
            .store
            .transition(job_id, JobStatus::Queued, JobStatus::Running, &claim)?
        {
            tracing::info!("Job {} was claimed by another worker", job_id);
            return Ok(RunOutcome::Skipped(SkipReason::LostRace));
        }
        tracing::info!("Job {} running: {}", job_id, target);

        match self.engine.scan(&target).await {
            Ok(result) => self.complete_full(job_id, &result),
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!("Job {} scan failed ({}), running partial probe", job_id, reason);
                self.fall_back(job_id, &target, reason).await
            }
        }
    }

    /// `QUEUED -> FAILED` without touching the network
    fn fail_unresolved(&self, job_id: i64) -> Result<RunOutcome, ScanError> {
        tracing::error!("Job {} has no target URL", job_id);
        let update = JobUpdate {
            finished_at: Some(Utc::now()),
            error: Some(WEBSITE_NOT_FOUND.to_string()),
            ..JobUpdate::default()
        };

        if self
            .store
            .transition(job_id, JobStatus::Queued, JobStatus::Failed, &update)?
        {
            Ok(RunOutcome::Failed {
                reason: WEBSITE_NOT_FOUND.to_string(),
            })
        } else {
            Ok(RunOutcome::Skipped(SkipReason::LostRace))
        }
    }

    fn complete_full(&self, job_id: i64, result: &ScanResult) -> Result<RunOutcome, ScanError> {
        let update = build_full_update(result);
        match update {
            Ok(update) => self.finish(
                job_id,
                JobStatus::Completed,
                update,
                RunOutcome::Completed {
                    mode: ScanMode::Full,
                    score: result.score,
                },
            ),
            Err(e) => self.fail_running(job_id, e.to_string()),
        }
    }

    async fn fall_back(
        &self,
        job_id: i64,
        target: &str,
        reason: String,
    ) -> Result<RunOutcome, ScanError> {
        let probe = match self.prober.probe(target).await {
            Ok(probe) => probe,
            Err(probe_error) => {
                tracing::error!(
                    "Job {} partial probe failed: {}; keeping original error",
                    job_id,
                    probe_error
                );
                return self.fail_running(job_id, reason);
            }
        };

        match build_partial_update(&probe, &reason) {
            Ok(update) => self.finish(
                job_id,
                JobStatus::Completed,
                update,
                RunOutcome::Completed {
                    mode: ScanMode::Partial,
                    score: 0,
                },
            ),
            Err(e) => self.fail_running(job_id, e.to_string()),
        }
    }

    fn fail_running(&self, job_id: i64, reason: String) -> Result<RunOutcome, ScanError> {
        let update = JobUpdate {
            finished_at: Some(Utc::now()),
            error: Some(reason.clone()),
            ..JobUpdate::default()
        };
        self.finish(job_id, JobStatus::Failed, update, RunOutcome::Failed { reason })
    }

    /// Moves a running job to its terminal state
    fn finish(
        &self,
        job_id: i64,
        to: JobStatus,
        update: JobUpdate,
        outcome: RunOutcome,
    ) -> Result<RunOutcome, ScanError> {
        match self
            .store
            .transition(job_id, JobStatus::Running, to, &update)
        {
            Ok(true) => {
                tracing::info!("Job {} {}", job_id, outcome);
                Ok(outcome)
            }
            Ok(false) => {
                tracing::warn!(
                    "Job {} left RUNNING outside this runner; result discarded",
                    job_id
                );
                Ok(RunOutcome::Skipped(SkipReason::LostRace))
            }
            Err(e) => {
                tracing::error!("Job {} could not be moved to {}: {}", job_id, to, e);
                self.release_running(job_id, &e);
                Err(e.into())
            }
        }
    }

    /// Last attempt to move a job out of `RUNNING` after a failed terminal write
    ///
    /// Writes only the store error, no payload.
    fn release_running(&self, job_id: i64, cause: &StorageError) {
        let update = JobUpdate {
            finished_at: Some(Utc::now()),
            error: Some(cause.to_string()),
            ..JobUpdate::default()
        };
        match self
            .store
            .transition(job_id, JobStatus::Running, JobStatus::Failed, &update)
        {
            Ok(true) => tracing::warn!("Job {} marked FAILED after store error", job_id),
            Ok(false) => tracing::warn!("Job {} already left RUNNING", job_id),
            Err(e) => tracing::error!("Job {} is stuck in RUNNING: {}", job_id, e),
        }
    }
}

fn build_full_update(result: &ScanResult) -> Result<JobUpdate, StorageError> {
    Ok(JobUpdate {
        finished_at: Some(Utc::now()),
        score: Some(result.score),
        summary: Some(serde_json::to_value(FullSummary::from_result(result))?),
        results: Some(serde_json::to_value(&result.issues)?),
        ..JobUpdate::default()
    })
}

fn build_partial_update(probe: &PartialProbeResult, reason: &str) -> Result<JobUpdate, StorageError> {
    Ok(JobUpdate {
        finished_at: Some(Utc::now()),
        score: Some(0),
        summary: Some(serde_json::to_value(PartialSummary::from_probe(probe))?),
        results: Some(serde_json::to_value(probe)?),
        error: Some(reason.to_string()),
        ..JobUpdate::default()
    })
}
