//! Accessibility rules
//!
//! Each rule maps extracted page facts to at most one issue. Severities follow
//! how badly the failure blocks assistive technology users.

use crate::fetcher::{HeadingFacts, PageFacts};
use crate::rules::{Category, PageContext, RegulationRef, RuleChecker, ScanIssue, Severity};

/// More than this many images without `alt` makes the issue critical
const ALT_CRITICAL_THRESHOLD: usize = 5;

/// Accessibility rule set
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessibilityChecker;

impl RuleChecker for AccessibilityChecker {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn check(&self, page: &PageContext<'_>) -> Vec<ScanIssue> {
        let facts = page.facts;
        [
            check_image_alt(facts),
            check_lang(facts),
            check_headings_present(facts),
            check_h1(facts),
            check_heading_order(facts),
            check_form_labels(facts),
            check_title(facts),
            check_link_text(facts),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Images without an `alt` attribute (an empty `alt` is fine)
pub fn check_image_alt(facts: &PageFacts) -> Option<ScanIssue> {
    let missing: Vec<_> = facts.images.iter().filter(|img| img.alt.is_none()).collect();
    if missing.is_empty() {
        return None;
    }

    let severity = if missing.len() > ALT_CRITICAL_THRESHOLD {
        Severity::Critical
    } else {
        Severity::Warning
    };

    let mut issue = ScanIssue::new(
        "a11y-img-alt",
        Category::Accessibility,
        severity,
        "Images missing alternative text",
    )
    .message(format!(
        "{} of {} images have no alt attribute",
        missing.len(),
        facts.images.len()
    ))
    .description(
        "Screen readers announce images without an alt attribute by file name or \
         skip them entirely, so their content is lost to blind users.",
    )
    .regulation(RegulationRef::wcag("1.1.1"))
    .fix(r#"Add an alt attribute describing each image; use alt="" for purely decorative images."#)
    .doc_url("https://www.w3.org/WAI/WCAG21/Understanding/non-text-content.html");

    if let Some(first) = missing.first() {
        issue = issue.snippet(format!(r#"<img src="{}">"#, first.src), None);
    }

    Some(issue)
}

/// Root element without a `lang` attribute
pub fn check_lang(facts: &PageFacts) -> Option<ScanIssue> {
    if facts.has_lang() {
        return None;
    }

    Some(
        ScanIssue::new(
            "a11y-html-lang",
            Category::Accessibility,
            Severity::Warning,
            "Missing page language",
        )
        .message("The <html> element has no lang attribute")
        .description(
            "Without a declared language, screen readers guess the pronunciation rules \
             and may read the page in the wrong voice.",
        )
        .regulation(RegulationRef::wcag("3.1.1"))
        .fix(r#"Declare the primary language on the root element, e.g. <html lang="en">."#)
        .doc_url("https://www.w3.org/WAI/WCAG21/Understanding/language-of-page.html"),
    )
}

/// Page without any headings
pub fn check_headings_present(facts: &PageFacts) -> Option<ScanIssue> {
    if !facts.headings.is_empty() {
        return None;
    }

    Some(
        ScanIssue::new(
            "a11y-no-headings",
            Category::Accessibility,
            Severity::Warning,
            "No headings found",
        )
        .message("The page contains no <h1>-<h6> elements")
        .description(
            "Headings are the main way assistive technology users skim and navigate a page.",
        )
        .regulation(RegulationRef::wcag("1.3.1"))
        .fix("Structure the content with headings, starting with a single <h1>.")
        .doc_url("https://www.w3.org/WAI/tutorials/page-structure/headings/"),
    )
}

/// Headings exist but none of them is an `<h1>`
pub fn check_h1(facts: &PageFacts) -> Option<ScanIssue> {
    if facts.headings.is_empty() || facts.headings.iter().any(|h| h.level == 1) {
        return None;
    }

    Some(
        ScanIssue::new(
            "a11y-missing-h1",
            Category::Accessibility,
            Severity::Warning,
            "Missing main heading",
        )
        .message("The page has headings but no <h1>")
        .description("The <h1> tells users what the page is about before they read any further.")
        .regulation(RegulationRef::wcag("2.4.6"))
        .fix("Add one <h1> that names the page's main topic.")
        .doc_url("https://www.w3.org/WAI/WCAG21/Understanding/headings-and-labels.html"),
    )
}

/// Finds the first place a heading goes more than one level deeper than its predecessor
fn first_skipped_level(headings: &[HeadingFacts]) -> Option<(u8, u8)> {
    headings
        .windows(2)
        .map(|pair| (pair[0].level, pair[1].level))
        .find(|(prev, next)| *next > prev + 1)
}

/// Heading hierarchy that skips a level (reported once, at the first skip)
pub fn check_heading_order(facts: &PageFacts) -> Option<ScanIssue> {
    let (from, to) = first_skipped_level(&facts.headings)?;

    Some(
        ScanIssue::new(
            "a11y-heading-order",
            Category::Accessibility,
            Severity::Info,
            "Heading levels skipped",
        )
        .message(format!("Heading level jumps from h{} to h{}", from, to))
        .description(
            "Skipped heading levels make the document outline harder to follow for \
             screen reader users.",
        )
        .regulation(RegulationRef::wcag("1.3.1"))
        .fix(format!("Use h{} before introducing h{}.", from + 1, to))
        .snippet(format!("<h{}> → <h{}>", from, to), None),
    )
}

/// Forms without any `<label>`
pub fn check_form_labels(facts: &PageFacts) -> Option<ScanIssue> {
    let unlabeled = facts.forms.iter().filter(|form| !form.has_labels).count();
    if unlabeled == 0 {
        return None;
    }

    Some(
        ScanIssue::new(
            "a11y-form-labels",
            Category::Accessibility,
            Severity::Critical,
            "Form inputs without labels",
        )
        .message(format!("{} form(s) contain no <label> elements", unlabeled))
        .description(
            "Unlabelled inputs are announced only as \"edit text\", so users of assistive \
             technology cannot tell what to enter.",
        )
        .regulation(RegulationRef::wcag("3.3.2"))
        .fix(r#"Associate a <label for="..."> with every input, or wrap the input in its label."#)
        .doc_url("https://www.w3.org/WAI/tutorials/forms/labels/"),
    )
}

/// Missing or blank `<title>`
pub fn check_title(facts: &PageFacts) -> Option<ScanIssue> {
    let has_title = facts
        .title
        .as_deref()
        .is_some_and(|title| !title.trim().is_empty());
    if has_title {
        return None;
    }

    Some(
        ScanIssue::new(
            "a11y-page-title",
            Category::Accessibility,
            Severity::Critical,
            "Missing page title",
        )
        .message("The page has no <title> or the title is empty")
        .description(
            "The title is the first thing a screen reader announces and identifies the \
             page in tabs, bookmarks and search results.",
        )
        .regulation(RegulationRef::wcag("2.4.2"))
        .fix("Add a descriptive, unique <title> inside <head>.")
        .doc_url("https://www.w3.org/WAI/WCAG21/Understanding/page-titled.html"),
    )
}

/// Links without visible text
pub fn check_link_text(facts: &PageFacts) -> Option<ScanIssue> {
    let empty: Vec<_> = facts
        .links
        .iter()
        .filter(|link| link.text.trim().is_empty())
        .collect();
    let first = empty.first()?;

    Some(
        ScanIssue::new(
            "a11y-link-text",
            Category::Accessibility,
            Severity::Warning,
            "Links without text",
        )
        .message(format!("{} link(s) have no visible text", empty.len()))
        .description(
            "Links without text are announced only by their URL, so their purpose is \
             unclear out of context.",
        )
        .regulation(RegulationRef::wcag("2.4.4"))
        .fix("Give every link descriptive text, or an aria-label for icon-only links.")
        .doc_url("https://www.w3.org/WAI/WCAG21/Understanding/link-purpose-in-context.html")
        .snippet(format!(r#"<a href="{}"></a>"#, first.href), None),
    )
}
