//! Integration tests for the scanner
//!
//! These tests use wiremock to create mock HTTP servers and drive the fetch,
//! scan and job pipeline end-to-end.

mod common;
mod job_tests;
mod scan_tests;
