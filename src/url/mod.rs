//! URL handling module for Sumi-Scan
//!
//! Target URLs arrive as arbitrary user-supplied text. This module turns them
//! into absolute `http(s)` URLs and derives the few related URLs the scanner
//! needs.

mod normalize;

pub use normalize::{is_https, normalize_target, robots_url};
