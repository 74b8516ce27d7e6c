//! Rule checkers
//!
//! Two independent sets of pure rules run against an already-fetched page:
//! - `accessibility`: alt text, language, headings, form labels, title, link text
//! - `compliance`: HTTPS, security headers, cookie consent, privacy and contact links
//!
//! No rule performs I/O or looks at another rule's output, so rules can run in
//! any order and produce the same issues for the same input.

mod accessibility;
mod compliance;
mod issue;

pub use accessibility::AccessibilityChecker;
pub use compliance::{ComplianceChecker, SECURITY_HEADERS};
pub use issue::{Category, CodeSnippet, RegulationRef, ScanIssue, Severity};

use crate::fetcher::PageFacts;
use reqwest::header::HeaderMap;
use url::Url;

/// Everything a rule may look at for one page
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Final URL after redirects
    pub url: &'a Url,
    pub headers: &'a HeaderMap,
    /// Raw markup, for keyword heuristics
    pub html: &'a str,
    pub facts: &'a PageFacts,
}

/// A stateless set of rules
pub trait RuleChecker {
    /// Short identifier recorded in scan results
    fn name(&self) -> &'static str;

    /// Runs every rule in the set, in a fixed order
    fn check(&self, page: &PageContext<'_>) -> Vec<ScanIssue>;
}
