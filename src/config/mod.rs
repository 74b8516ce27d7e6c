//! Configuration module for Sumi-Scan
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or `Config::default()`) is valid.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scan::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sumi-scan.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.scanner.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ProbeConfig, ScannerConfig, StoreConfig, WorkerConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
