//! Storage traits and error types
//!
//! This module defines the interface the job runner needs from a job store:
//! a lookup and an atomic, status-guarded update.

use crate::state::JobStatus;
use crate::storage::{JobRecord, JobUpdate};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Job not found: {0}")]
    JobNotFound(i64),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Unknown job status in store: {0}")]
    UnknownStatus(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// Implementations must be safe to share between concurrently running jobs.
pub trait JobStore: Send + Sync {
    /// Loads a job's status and target URL
    ///
    /// Returns `Ok(None)` if no job with this id exists.
    fn load_job(&self, job_id: i64) -> StorageResult<Option<JobRecord>>;

    /// Atomically moves a job from `from` to `to` and applies `update`
    ///
    /// The update only happens if the job's current status is still `from`
    /// (compare-and-set). This is what makes job execution at-most-once when
    /// the same id is triggered twice.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - the job was in `from` and has been updated
    /// * `Ok(false)` - the job was not in `from` (or does not exist); nothing changed
    /// * `Err(StorageError::InvalidTransition)` - `from -> to` is not a legal move
    fn transition(
        &self,
        job_id: i64,
        from: JobStatus,
        to: JobStatus,
        update: &JobUpdate,
    ) -> StorageResult<bool>;

    /// Lists the ids of all jobs currently in `QUEUED`, oldest first
    fn queued_job_ids(&self) -> StorageResult<Vec<i64>>;
}
