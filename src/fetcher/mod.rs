//! Page fetcher and extractor
//!
//! This module contains everything between a target URL and the facts the
//! rule checkers look at:
//! - HTTP client construction with a browser-like header set
//! - A single bounded-time GET of the target page
//! - Tolerant extraction of structural facts from the returned markup

mod client;
mod parser;

pub use client::{build_http_client, fetch_page, FetchedPage};
pub use parser::{
    parse_html, FormFacts, HeadingFacts, ImageFacts, LinkFacts, MetaTag, PageFacts,
};
