//! Sumi-Scan: a single-page website compliance scanner
//!
//! This crate fetches one untrusted web page, runs accessibility and
//! compliance/security rules against it, and turns the findings into a
//! 0-100 score with a risk level. Scans are driven by persisted jobs: the
//! [`job::JobRunner`] moves a job from `queued` to a terminal state, falling
//! back to a lightweight [`probe::PartialProbe`] when the full fetch fails.

pub mod config;
pub mod fetcher;
pub mod job;
pub mod probe;
pub mod robots;
pub mod rules;
pub mod scan;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scan operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Non-2xx response. The display form is the persisted failure reason.
    #[error("FETCH_FAILED_{status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Request timed out after {secs}s: {url}")]
    Timeout { url: String, secs: u64 },

    #[error("Failed to fetch {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Invalid target URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Probe failed for {url}: {message}")]
    Probe { url: String, message: String },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for Sumi-Scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use job::{JobPool, JobRunner, RunOutcome};
pub use probe::{PartialProbe, PartialProbeResult};
pub use rules::{Category, ScanIssue, Severity};
pub use scan::{RiskLevel, ScanResult, Scanner};
pub use state::JobStatus;
pub use crate::url::normalize_target;
