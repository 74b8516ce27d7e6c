//! HTML fact extraction
//!
//! This module pulls the structural facts the rule checkers need out of raw
//! markup:
//! - Images and whether they carry an `alt` attribute
//! - Links with their visible text
//! - Forms, their input count and whether they contain a `<label>`
//! - Headings in document order
//! - The root `lang` attribute, page title and meta tags
//!
//! Parsing goes through html5ever's error-recovering tokenizer, so broken
//! markup never fails extraction; structures it cannot find are reported as
//! absent.

use scraper::{ElementRef, Html, Selector};

/// An `<img>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFacts {
    pub src: String,
    /// `None` when the attribute is missing entirely; `Some("")` is a
    /// deliberate decorative-image marker
    pub alt: Option<String>,
}

/// An `<a href>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFacts {
    pub href: String,
    /// Visible text, whitespace-collapsed
    pub text: String,
}

/// A `<form>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFacts {
    /// Number of user-editable controls (`input`, `select`, `textarea`)
    pub input_count: usize,
    /// True if at least one `<label>` appears anywhere inside the form
    pub has_labels: bool,
}

/// An `<h1>`-`<h6>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingFacts {
    pub level: u8,
    pub text: String,
}

/// A `<meta name|property=... content=...>` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    /// Lowercased `name` (or `property`) attribute
    pub name: String,
    pub content: String,
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    pub images: Vec<ImageFacts>,
    pub links: Vec<LinkFacts>,
    pub forms: Vec<FormFacts>,
    pub headings: Vec<HeadingFacts>,
    /// Non-blank `lang` attribute on the root element
    pub lang: Option<String>,
    /// Trimmed `<title>` text; `Some("")` for an empty title element
    pub title: Option<String>,
    pub meta: Vec<MetaTag>,
}

impl PageFacts {
    /// Returns true if the root element declares a language
    pub fn has_lang(&self) -> bool {
        self.lang.is_some()
    }

    /// Returns true if a `<meta name="viewport">` is declared
    pub fn has_viewport(&self) -> bool {
        self.meta_content("viewport").is_some()
    }

    /// Looks up the content of a meta tag by (case-insensitive) name
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.meta
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.content.as_str())
    }
}

/// Extracts page facts from raw HTML
///
/// This never fails: html5ever recovers from any input, and each extractor
/// degrades to an empty list if its selector finds nothing.
///
/// # Example
///
/// ```
/// use sumi_scan::fetcher::parse_html;
///
/// let html = r#"<html lang="en"><head><title>Shop</title></head>
///     <body><h1>Welcome</h1><img src="a.png"></body></html>"#;
/// let facts = parse_html(html);
/// assert_eq!(facts.title.as_deref(), Some("Shop"));
/// assert_eq!(facts.images[0].alt, None);
/// assert!(facts.has_lang());
/// ```
pub fn parse_html(html: &str) -> PageFacts {
    let document = Html::parse_document(html);

    PageFacts {
        images: extract_images(&document),
        links: extract_links(&document),
        forms: extract_forms(&document),
        headings: extract_headings(&document),
        lang: extract_lang(&document),
        title: extract_title(&document),
        meta: extract_meta(&document),
    }
}

/// Collapses runs of whitespace and trims the result
fn collapse_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_images(document: &Html) -> Vec<ImageFacts> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| ImageFacts {
            src: element.value().attr("src").unwrap_or_default().to_string(),
            alt: element.value().attr("alt").map(str::to_string),
        })
        .collect()
}

fn extract_links(document: &Html) -> Vec<LinkFacts> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| LinkFacts {
            href: element
                .value()
                .attr("href")
                .unwrap_or_default()
                .trim()
                .to_string(),
            text: collapse_text(&element),
        })
        .collect()
}

fn extract_forms(document: &Html) -> Vec<FormFacts> {
    let (Ok(form_selector), Ok(input_selector), Ok(label_selector)) = (
        Selector::parse("form"),
        Selector::parse(
            "input:not([type=hidden]):not([type=submit]):not([type=button]):not([type=reset]):not([type=image]), select, textarea",
        ),
        Selector::parse("label"),
    ) else {
        return Vec::new();
    };

    document
        .select(&form_selector)
        .map(|form| FormFacts {
            input_count: form.select(&input_selector).count(),
            has_labels: form.select(&label_selector).next().is_some(),
        })
        .collect()
}

fn extract_headings(document: &Html) -> Vec<HeadingFacts> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let level = element
                .value()
                .name()
                .strip_prefix('h')
                .and_then(|digit| digit.parse::<u8>().ok())?;
            Some(HeadingFacts {
                level,
                text: collapse_text(&element),
            })
        })
        .collect()
}

fn extract_lang(document: &Html) -> Option<String> {
    document
        .root_element()
        .value()
        .attr("lang")
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Extracts the page title from the HTML document
///
/// `<title>` elements inside inline SVG label the graphic, not the page.
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .find(|element| !is_inside_svg(element))
        .map(|element| collapse_text(&element))
}

fn is_inside_svg(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|ancestor| ancestor.name() == "svg")
    })
}

fn extract_meta(document: &Html) -> Vec<MetaTag> {
    let Ok(selector) = Selector::parse("meta[content]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let value = element.value();
            let name = value.attr("name").or_else(|| value.attr("property"))?;
            Some(MetaTag {
                name: name.trim().to_ascii_lowercase(),
                content: value.attr("content").unwrap_or_default().to_string(),
            })
        })
        .collect()
}
