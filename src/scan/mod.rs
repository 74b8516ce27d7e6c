//! Scan aggregator
//!
//! Runs one full scan: fetch the page, extract facts, run every rule checker
//! against the same page, then score the combined issue list.

mod score;

pub use score::{classify_risk, compute_score, RiskLevel, SeverityCounts};

use crate::config::ScannerConfig;
use crate::fetcher::{build_http_client, fetch_page, parse_html, FetchedPage, PageFacts};
use crate::rules::{AccessibilityChecker, ComplianceChecker, PageContext, RuleChecker, ScanIssue};
use crate::ScanError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregate result of one full scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Final URL after redirects
    pub url: String,
    pub score: u8,
    pub risk_level: RiskLevel,
    pub issues: Vec<ScanIssue>,
    pub summary: SeverityCounts,
    pub scanned_at: DateTime<Utc>,
    pub rule_sets_checked: Vec<String>,
    pub status_code: u16,
    pub response_time_ms: u64,
    pub page: PageStats,
}

/// Counts of what the extractor found on the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    pub images: usize,
    pub images_missing_alt: usize,
    pub links: usize,
    pub forms: usize,
    pub headings: usize,
    pub has_viewport: bool,
}

impl PageStats {
    pub fn from_facts(facts: &PageFacts) -> Self {
        Self {
            images: facts.images.len(),
            images_missing_alt: facts.images.iter().filter(|img| img.alt.is_none()).count(),
            links: facts.links.len(),
            forms: facts.forms.len(),
            headings: facts.headings.len(),
            has_viewport: facts.has_viewport(),
        }
    }
}

/// Runs every rule checker against an already-fetched page and scores the result
///
/// This is pure: the same page always yields the same issues, score and risk.
pub fn scan_page(page: &FetchedPage) -> ScanResult {
    let facts = parse_html(&page.html);
    let context = PageContext {
        url: &page.url,
        headers: &page.headers,
        html: &page.html,
        facts: &facts,
    };

    let checkers: [&dyn RuleChecker; 2] = [&AccessibilityChecker, &ComplianceChecker];
    let issues: Vec<ScanIssue> = checkers
        .iter()
        .flat_map(|checker| checker.check(&context))
        .collect();

    let summary = SeverityCounts::from_issues(&issues);
    let score = compute_score(&summary);
    let risk_level = classify_risk(score, &summary);

    ScanResult {
        url: page.url.to_string(),
        score,
        risk_level,
        issues,
        summary,
        scanned_at: Utc::now(),
        rule_sets_checked: checkers
            .iter()
            .map(|checker| checker.name().to_string())
            .collect(),
        status_code: page.status_code,
        response_time_ms: u64::try_from(page.response_time.as_millis()).unwrap_or(u64::MAX),
        page: PageStats::from_facts(&facts),
    }
}

/// Full-page scanner
#[derive(Debug, Clone)]
pub struct Scanner {
    client: Client,
    timeout: Duration,
}

impl Scanner {
    /// Creates a scanner with its own HTTP client
    pub fn new(config: &ScannerConfig) -> Result<Self, ScanError> {
        Ok(Self {
            client: build_http_client(config)?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Fetches `target` and scans it
    ///
    /// Fetch failures are returned as-is; rule checking itself cannot fail.
    pub async fn scan(&self, target: &str) -> Result<ScanResult, ScanError> {
        let page = fetch_page(&self.client, target, self.timeout).await?;
        let result = scan_page(&page);
        tracing::info!(
            "Scanned {}: score {} ({}), {} issues",
            result.url,
            result.score,
            result.risk_level,
            result.issues.len()
        );
        Ok(result)
    }
}
