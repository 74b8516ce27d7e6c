//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::state::JobStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::{JobRecord, JobUpdate, ScanJob};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
///
/// The connection sits behind a mutex so one store can be shared by every
/// concurrently running job.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for tests and ad-hoc runs)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }

    /// Registers a scan target and returns its id
    pub fn insert_website(&self, url: &str) -> StorageResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO websites (url, created_at) VALUES (?1, ?2)",
            params![url, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Deletes a website; its jobs keep existing with no target
    pub fn delete_website(&self, website_id: i64) -> StorageResult<()> {
        self.conn()?
            .execute("DELETE FROM websites WHERE id = ?1", params![website_id])?;
        Ok(())
    }

    /// Creates a job in `QUEUED` and returns its id
    pub fn enqueue_job(&self, website_id: Option<i64>) -> StorageResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO scan_jobs (website_id, status, created_at) VALUES (?1, ?2, ?3)",
            params![
                website_id,
                JobStatus::Queued.to_db_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Loads a complete job row
    pub fn get_job(&self, job_id: i64) -> StorageResult<ScanJob> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT j.id, j.website_id, w.url, j.status, j.score, j.summary, j.results,
                        j.error, j.created_at, j.started_at, j.finished_at
                 FROM scan_jobs j LEFT JOIN websites w ON w.id = j.website_id
                 WHERE j.id = ?1",
                params![job_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<u8>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, Option<String>>(7)?,
                        row.get::<_, String>(8)?,
                        row.get::<_, Option<String>>(9)?,
                        row.get::<_, Option<String>>(10)?,
                    ))
                },
            )
            .optional()?
            .ok_or(StorageError::JobNotFound(job_id))?;

        let (
            id,
            website_id,
            target_url,
            status,
            score,
            summary,
            results,
            error,
            created_at,
            started_at,
            finished_at,
        ) = row;

        Ok(ScanJob {
            id,
            website_id,
            target_url,
            status: parse_status(&status)?,
            score,
            summary: parse_json(summary)?,
            results: parse_json(results)?,
            error,
            created_at,
            started_at,
            finished_at,
        })
    }
}

fn parse_status(value: &str) -> StorageResult<JobStatus> {
    JobStatus::from_db_string(value).ok_or_else(|| StorageError::UnknownStatus(value.to_string()))
}

fn parse_json(value: Option<String>) -> StorageResult<Option<Value>> {
    value
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(StorageError::from)
}

fn to_json(value: &Option<Value>) -> StorageResult<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(StorageError::from)
}

impl JobStore for SqliteStorage {
    fn load_job(&self, job_id: i64) -> StorageResult<Option<JobRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT j.id, j.status, w.url
                 FROM scan_jobs j LEFT JOIN websites w ON w.id = j.website_id
                 WHERE j.id = ?1",
                params![job_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, status, target_url)| {
            Ok(JobRecord {
                id,
                status: parse_status(&status)?,
                target_url,
            })
        })
        .transpose()
    }

    fn transition(
        &self,
        job_id: i64,
        from: JobStatus,
        to: JobStatus,
        update: &JobUpdate,
    ) -> StorageResult<bool> {
        if !from.can_transition_to(to) {
            return Err(StorageError::InvalidTransition { from, to });
        }

        let summary = to_json(&update.summary)?;
        let results = to_json(&update.results)?;

        let changed = self.conn()?.execute(
            "UPDATE scan_jobs SET
                status = ?1,
                started_at = COALESCE(?2, started_at),
                finished_at = COALESCE(?3, finished_at),
                score = COALESCE(?4, score),
                summary = COALESCE(?5, summary),
                results = COALESCE(?6, results),
                error = COALESCE(?7, error)
             WHERE id = ?8 AND status = ?9",
            params![
                to.to_db_string(),
                update.started_at.map(|t| t.to_rfc3339()),
                update.finished_at.map(|t| t.to_rfc3339()),
                update.score,
                summary,
                results,
                update.error,
                job_id,
                from.to_db_string(),
            ],
        )?;

        Ok(changed == 1)
    }

    fn queued_job_ids(&self) -> StorageResult<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM scan_jobs WHERE status = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![JobStatus::Queued.to_db_string()], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }
}
