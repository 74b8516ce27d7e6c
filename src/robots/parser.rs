//! Robots.txt parser implementation
//!
//! Rule matching and directive parsing both go through the robotstxt crate.

use robotstxt::{parse_robotstxt, DefaultMatcher, RobotsParseHandler};

const GENERIC_AGENT: &str = "sumi-scan";

/// Parsed robots.txt content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsPolicy {
    content: String,
}

impl RobotsPolicy {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks if a path is allowed for the given user agent
    ///
    /// Empty content allows everything.
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, path)
    }

    /// Returns true if generic crawlers are asked to stay off the whole site
    ///
    /// Checked with an agent name no site lists explicitly, so only the `*`
    /// group applies.
    pub fn blocks_all_crawlers(&self) -> bool {
        !self.is_allowed("https://robots.invalid/", GENERIC_AGENT)
    }

    /// Lists the `Sitemap:` URLs declared in the file
    pub fn sitemaps(&self) -> Vec<String> {
        let mut collector = SitemapCollector::default();
        parse_robotstxt(&self.content, &mut collector);
        collector.sitemaps
    }

    /// One-line description for probe output
    pub fn describe(&self) -> String {
        let access = if self.blocks_all_crawlers() {
            "disallows all crawlers"
        } else {
            "allows crawling"
        };

        match self.sitemaps().len() {
            0 => format!("robots.txt reachable; {}", access),
            n => format!("robots.txt reachable; {}; {} sitemap(s) declared", access, n),
        }
    }
}

/// Parse handler that keeps only `Sitemap:` values
#[derive(Default)]
struct SitemapCollector {
    sitemaps: Vec<String>,
}

impl RobotsParseHandler for SitemapCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.sitemaps.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}
