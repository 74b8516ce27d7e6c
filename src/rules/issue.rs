//! Finding types produced by the rule checkers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-issue importance tier
///
/// Ordering follows priority: `Critical > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Points deducted from the score for one issue of this severity
    pub fn weight(&self) -> u32 {
        match self {
            Self::Critical => 20,
            Self::Warning => 10,
            Self::Info => 2,
        }
    }

    /// Capitalised label used in headline summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compliance area an issue belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Accessibility,
    #[serde(rename = "GDPR")]
    Gdpr,
    Security,
    Privacy,
    Performance,
    #[serde(rename = "SEO")]
    Seo,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessibility => "Accessibility",
            Self::Gdpr => "GDPR",
            Self::Security => "Security",
            Self::Privacy => "Privacy",
            Self::Performance => "Performance",
            Self::Seo => "SEO",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The regulation or standard an issue is measured against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulationRef {
    /// e.g. "WCAG", "GDPR"
    pub name: String,
    /// e.g. "1.1.1", "Art. 32"
    pub rule: String,
    /// e.g. "2.1", "2016/679"
    pub version: String,
}

impl RegulationRef {
    pub fn new(name: &str, rule: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            rule: rule.to_string(),
            version: version.to_string(),
        }
    }

    pub fn wcag(rule: &str) -> Self {
        Self::new("WCAG", rule, "2.1")
    }

    pub fn gdpr(rule: &str) -> Self {
        Self::new("GDPR", rule, "2016/679")
    }
}

/// Offending markup attached to an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One discrete finding
///
/// Built once by a rule checker through the consuming builder methods and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanIssue {
    /// Stable rule code, e.g. `a11y-img-alt`
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulation: Option<RegulationRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<CodeSnippet>,
}

impl ScanIssue {
    pub fn new(id: &str, category: Category, severity: Severity, title: &str) -> Self {
        Self {
            id: id.to_string(),
            category,
            severity,
            title: title.to_string(),
            message: String::new(),
            description: String::new(),
            regulation: None,
            fix: None,
            doc_url: None,
            snippet: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn regulation(mut self, regulation: RegulationRef) -> Self {
        self.regulation = Some(regulation);
        self
    }

    pub fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn doc_url(mut self, url: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self
    }

    pub fn snippet(mut self, code: impl Into<String>, line: Option<u32>) -> Self {
        self.snippet = Some(CodeSnippet {
            code: code.into(),
            line,
        });
        self
    }

    /// Headline form used in job summaries: `<Severity> • <Category> • <Title>`
    pub fn headline(&self) -> String {
        format!(
            "{} • {} • {}",
            self.severity.label(),
            self.category,
            self.title
        )
    }
}
