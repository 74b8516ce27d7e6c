//! Job summary payloads
//!
//! These are the shapes written into a job's `summary` column. Consumers key
//! off `mode` to tell a full scan from a partial probe.

use crate::probe::PartialProbeResult;
use crate::rules::{ScanIssue, Severity};
use crate::scan::{RiskLevel, ScanResult};
use crate::state::ScanMode;
use serde::{Deserialize, Serialize};

/// Maximum number of headline issues kept in a summary
pub const TOP_ISSUE_LIMIT: usize = 5;

/// Summary of a completed full scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSummary {
    pub mode: ScanMode,
    pub risk_level: RiskLevel,
    pub top_issues: Vec<String>,
    pub critical: u32,
    pub warning: u32,
    pub info: u32,
    pub total: u32,
}

impl FullSummary {
    pub fn from_result(result: &ScanResult) -> Self {
        Self {
            mode: ScanMode::Full,
            risk_level: result.risk_level,
            top_issues: top_issues(&result.issues),
            critical: result.summary.critical,
            warning: result.summary.warning,
            info: result.summary.info,
            total: result.summary.total(),
        }
    }
}

/// Summary of a job that fell back to the partial probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSummary {
    pub mode: ScanMode,
    pub reason: String,
}

impl PartialSummary {
    pub fn from_probe(result: &PartialProbeResult) -> Self {
        Self {
            mode: ScanMode::Partial,
            reason: result.reason.clone(),
        }
    }
}

/// Picks up to [`TOP_ISSUE_LIMIT`] headline issues
///
/// Critical and warning issues are preferred, most severe first; info issues
/// are only used when nothing more severe was found. Within a severity the
/// checker order is kept.
pub fn top_issues(issues: &[ScanIssue]) -> Vec<String> {
    let mut picked: Vec<&ScanIssue> = issues
        .iter()
        .filter(|issue| issue.severity >= Severity::Warning)
        .collect();
    if picked.is_empty() {
        picked = issues.iter().collect();
    }

    picked.sort_by(|a, b| b.severity.cmp(&a.severity));
    picked
        .into_iter()
        .take(TOP_ISSUE_LIMIT)
        .map(ScanIssue::headline)
        .collect()
}
