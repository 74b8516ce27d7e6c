//! Scan job execution
//!
//! This module turns queued jobs into terminal outcomes:
//! - `runner`: the per-job state machine with its partial-probe fallback
//! - `pool`: bounded concurrent execution of many jobs
//! - `summary`: the summary payloads written back to the job record

mod pool;
mod runner;
mod summary;

pub use pool::JobPool;
pub use runner::{JobRunner, Prober, RunOutcome, ScanEngine, SkipReason, WEBSITE_NOT_FOUND};
pub use summary::{top_issues, FullSummary, PartialSummary, TOP_ISSUE_LIMIT};
