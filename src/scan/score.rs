//! Scoring and risk classification
//!
//! The weights (20 per critical, 10 per warning, 2 per info) and the
//! critical-count override are fixed product heuristics that downstream
//! consumers compare against; keep them exact.

use crate::rules::{ScanIssue, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of issues per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub warning: u32,
    pub info: u32,
}

impl SeverityCounts {
    /// Tallies a list of issues
    pub fn from_issues(issues: &[ScanIssue]) -> Self {
        issues
            .iter()
            .fold(Self::default(), |mut counts, issue| {
                match issue.severity {
                    Severity::Critical => counts.critical += 1,
                    Severity::Warning => counts.warning += 1,
                    Severity::Info => counts.info += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> u32 {
        self.critical + self.warning + self.info
    }
}

/// Coarse classification of a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computes `max(0, 100 - 20·critical - 10·warning - 2·info)`
pub fn compute_score(counts: &SeverityCounts) -> u8 {
    let penalty = u64::from(counts.critical) * u64::from(Severity::Critical.weight())
        + u64::from(counts.warning) * u64::from(Severity::Warning.weight())
        + u64::from(counts.info) * u64::from(Severity::Info.weight());

    100u64.saturating_sub(penalty) as u8
}

/// Classifies risk from the score and the critical count
///
/// | Condition | Risk |
/// |-----------|------|
/// | any critical issue, or score < 40 | Critical |
/// | score < 60 | High |
/// | score < 80 | Medium |
/// | otherwise | Low |
///
/// A single critical issue forces `Critical` even when it costs only 20 points.
pub fn classify_risk(score: u8, counts: &SeverityCounts) -> RiskLevel {
    if counts.critical > 0 || score < 40 {
        RiskLevel::Critical
    } else if score < 60 {
        RiskLevel::High
    } else if score < 80 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
