//! Compliance and security rules
//!
//! HTTPS, the standard security response headers, and three markup
//! heuristics: a cookie-consent mechanism, a privacy policy link and a
//! contact link.

use crate::fetcher::PageFacts;
use crate::rules::{Category, PageContext, RegulationRef, RuleChecker, ScanIssue, Severity};
use crate::url::is_https;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use url::Url;

static COOKIE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cookie").expect("cookie pattern is valid"));

static CONSENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)consent|accept|agree|opt[- ]?(in|out)|einwilligung|zustimm")
        .expect("consent pattern is valid")
});

static PRIVACY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)privacy|datenschutz|privacidad|confidentialit")
        .expect("privacy pattern is valid")
});

static CONTACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)contact|kontakt|impressum|contacto").expect("contact pattern is valid")
});

/// A security response header the scanner expects
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeader {
    /// Lowercase header name
    pub name: &'static str,
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub fix: &'static str,
    pub doc_url: &'static str,
}

/// The four headers every page should send
pub const SECURITY_HEADERS: [SecurityHeader; 4] = [
    SecurityHeader {
        name: "strict-transport-security",
        code: "sec-header-hsts",
        title: "Missing Strict-Transport-Security header",
        description: "Without HSTS, browsers may still connect over plain HTTP, leaving \
                      visitors open to downgrade and cookie-hijacking attacks.",
        fix: "Send `Strict-Transport-Security: max-age=31536000; includeSubDomains`.",
        doc_url: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Strict-Transport-Security",
    },
    SecurityHeader {
        name: "content-security-policy",
        code: "sec-header-csp",
        title: "Missing Content-Security-Policy header",
        description: "A Content Security Policy limits where scripts and other resources \
                      may load from and is the main defence against cross-site scripting.",
        fix: "Start with `Content-Security-Policy: default-src 'self'` and allow-list \
              required third-party origins.",
        doc_url: "https://developer.mozilla.org/en-US/docs/Web/HTTP/CSP",
    },
    SecurityHeader {
        name: "x-frame-options",
        code: "sec-header-xfo",
        title: "Missing X-Frame-Options header",
        description: "Pages that can be framed by any origin are exposed to clickjacking.",
        fix: "Send `X-Frame-Options: DENY` (or SAMEORIGIN), or a CSP `frame-ancestors` directive.",
        doc_url: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/X-Frame-Options",
    },
    SecurityHeader {
        name: "x-content-type-options",
        code: "sec-header-xcto",
        title: "Missing X-Content-Type-Options header",
        description: "Without it, browsers may MIME-sniff responses and execute uploaded \
                      content as script.",
        fix: "Send `X-Content-Type-Options: nosniff`.",
        doc_url: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/X-Content-Type-Options",
    },
];

/// Compliance and security rule set
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceChecker;

impl RuleChecker for ComplianceChecker {
    fn name(&self) -> &'static str {
        "compliance"
    }

    fn check(&self, page: &PageContext<'_>) -> Vec<ScanIssue> {
        let mut issues = Vec::new();
        issues.extend(check_https(page.url));
        issues.extend(check_security_headers(page.headers));
        issues.extend(check_cookie_consent(page.html));
        issues.extend(check_privacy_link(page.facts));
        issues.extend(check_contact_link(page.facts));
        issues
    }
}

/// Final URL not served over HTTPS
pub fn check_https(url: &Url) -> Option<ScanIssue> {
    if is_https(url) {
        return None;
    }

    Some(
        ScanIssue::new(
            "sec-https",
            Category::Security,
            Severity::Critical,
            "Site is not served over HTTPS",
        )
        .message(format!("The page was delivered over {}://", url.scheme()))
        .description(
            "Unencrypted connections expose everything visitors submit, including \
             personal data, to anyone on the network path.",
        )
        .regulation(RegulationRef::gdpr("Art. 32"))
        .fix("Install a TLS certificate and redirect all HTTP traffic to HTTPS.")
        .doc_url("https://letsencrypt.org/getting-started/"),
    )
}

/// One warning per missing security header
pub fn check_security_headers(headers: &HeaderMap) -> Vec<ScanIssue> {
    SECURITY_HEADERS
        .iter()
        .filter(|header| !headers.contains_key(header.name))
        .map(|header| {
            ScanIssue::new(
                header.code,
                Category::Security,
                Severity::Warning,
                header.title,
            )
            .message(format!("Response has no {} header", header.name))
            .description(header.description)
            .fix(header.fix)
            .doc_url(header.doc_url)
        })
        .collect()
}

/// Cookie consent heuristic: both a cookie keyword and a consent keyword must appear
pub fn check_cookie_consent(html: &str) -> Option<ScanIssue> {
    if COOKIE_PATTERN.is_match(html) && CONSENT_PATTERN.is_match(html) {
        return None;
    }

    Some(
        ScanIssue::new(
            "gdpr-cookie-consent",
            Category::Gdpr,
            Severity::Warning,
            "No cookie consent mechanism detected",
        )
        .message("No cookie banner or consent prompt was found in the page markup")
        .description(
            "Non-essential cookies may only be set after the visitor has given informed, \
             freely given consent.",
        )
        .regulation(RegulationRef::new("ePrivacy Directive", "Art. 5(3)", "2002/58/EC"))
        .fix("Add a consent banner that blocks non-essential cookies until the visitor opts in.")
        .doc_url("https://gdpr.eu/cookies/"),
    )
}

fn has_matching_link(facts: &PageFacts, pattern: &Regex) -> bool {
    facts
        .links
        .iter()
        .any(|link| pattern.is_match(&link.href) || pattern.is_match(&link.text))
}

/// No link whose href or text mentions privacy
pub fn check_privacy_link(facts: &PageFacts) -> Option<ScanIssue> {
    if has_matching_link(facts, &PRIVACY_PATTERN) {
        return None;
    }

    Some(
        ScanIssue::new(
            "gdpr-privacy-policy",
            Category::Privacy,
            Severity::Warning,
            "No privacy policy link found",
        )
        .message("No link to a privacy policy was found on the page")
        .description(
            "Visitors must be able to find out who processes their data, for what \
             purpose and how to exercise their rights.",
        )
        .regulation(RegulationRef::gdpr("Art. 13"))
        .fix("Link to the privacy policy from every page, typically in the footer.")
        .doc_url("https://gdpr.eu/privacy-notice/"),
    )
}

/// No link whose href or text mentions contact details
pub fn check_contact_link(facts: &PageFacts) -> Option<ScanIssue> {
    if has_matching_link(facts, &CONTACT_PATTERN) {
        return None;
    }

    Some(
        ScanIssue::new(
            "gdpr-contact",
            Category::Gdpr,
            Severity::Info,
            "No contact link found",
        )
        .message("No link to a contact or imprint page was found")
        .description(
            "Data subjects need a way to reach the controller, for example to request \
             access to or deletion of their data.",
        )
        .regulation(RegulationRef::gdpr("Art. 12"))
        .fix("Link to a contact page or imprint from the footer."),
    )
}
