//! Storage module for persisting scan jobs
//!
//! This module handles the job store the runner reads from and writes back to:
//! - The `JobStore` trait (lookup + status-guarded update)
//! - A SQLite implementation with its schema
//! - Record types for jobs and the fields a transition writes

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{JobStore, StorageError, StorageResult};

use crate::state::JobStatus;
use crate::ScanError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ScanError> {
    Ok(SqliteStorage::new(path)?)
}

/// What the runner needs to know about a job before executing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: i64,
    pub status: JobStatus,
    /// `None` when the job has no (or a deleted) website
    pub target_url: Option<String>,
}

/// Fields written alongside a status transition
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub score: Option<u8>,
    pub summary: Option<Value>,
    pub results: Option<Value>,
    pub error: Option<String>,
}

/// A full scan job row
#[derive(Debug, Clone, PartialEq)]
pub struct ScanJob {
    pub id: i64,
    pub website_id: Option<i64>,
    pub target_url: Option<String>,
    pub status: JobStatus,
    pub score: Option<u8>,
    pub summary: Option<Value>,
    pub results: Option<Value>,
    pub error: Option<String>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}
