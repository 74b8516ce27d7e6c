//! State module for tracking scan job progress
//!
//! # Components
//!
//! - `JobStatus`: lifecycle of a scan job (queued, running, completed, failed)
//! - `ScanMode`: whether a completed job carries a full or a partial result

mod job_state;

pub use job_state::{JobStatus, ScanMode};
