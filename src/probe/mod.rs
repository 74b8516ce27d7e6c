//! Partial probe
//!
//! When the full page fetch fails (bot defences, timeouts, non-2xx), the probe
//! collects whatever network-level signal is still available:
//! 1. Protocol: is the target `https`? (no network call)
//! 2. DNS: does the host resolve?
//! 3. Robots: is `/robots.txt` reachable, and what does it say?
//!
//! Each check absorbs its own failure so the others still run. The probe as a
//! whole only fails when the target cannot be interpreted as a URL at all.

use crate::config::ProbeConfig;
use crate::robots::{fetch_robots, RobotsFetch};
use crate::state::ScanMode;
use crate::url::{is_https, normalize_target};
use crate::ScanError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Reason recorded on every partial result
pub const PARTIAL_REASON: &str = "SITE_BLOCKED_AUTOMATED_SCANS";

/// Outcome of one probe check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

/// One probe check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub id: String,
    pub status: CheckStatus,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl Check {
    fn new(id: &str, status: CheckStatus, title: &str) -> Self {
        Self {
            id: id.to_string(),
            status,
            title: title.to_string(),
            detail: None,
            fix: None,
        }
    }

    fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// Result of a partial probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialProbeResult {
    /// Always [`ScanMode::Partial`]
    pub mode: ScanMode,
    pub reason: String,
    pub checks: Vec<Check>,
}

impl PartialProbeResult {
    fn new(checks: Vec<Check>) -> Self {
        Self {
            mode: ScanMode::Partial,
            reason: PARTIAL_REASON.to_string(),
            checks,
        }
    }

    /// Number of checks with the given status
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

/// Fetch-independent fallback prober
#[derive(Debug, Clone)]
pub struct PartialProbe {
    client: Client,
    dns_timeout: Duration,
}

impl PartialProbe {
    /// Creates a probe with its own short-timeout HTTP client
    pub fn new(config: &ProbeConfig, user_agent: &str) -> Result<Self, ScanError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            dns_timeout: timeout,
        })
    }

    /// Runs all three checks against `target`
    ///
    /// # Returns
    ///
    /// * `Ok(PartialProbeResult)` - checks ran (individual checks may have failed)
    /// * `Err(ScanError::Probe)` - the target is not a usable URL
    pub async fn probe(&self, target: &str) -> Result<PartialProbeResult, ScanError> {
        let url = normalize_target(target).map_err(|e| ScanError::Probe {
            url: target.to_string(),
            message: e.to_string(),
        })?;

        let protocol = check_protocol(&url);
        let (dns, robots) = tokio::join!(
            check_dns(&url, self.dns_timeout),
            check_robots(&self.client, &url)
        );

        let result = PartialProbeResult::new(vec![protocol, dns, robots]);
        tracing::info!(
            "Partial probe of {}: {} pass, {} fail, {} warn, {} info",
            url,
            result.count(CheckStatus::Pass),
            result.count(CheckStatus::Fail),
            result.count(CheckStatus::Warn),
            result.count(CheckStatus::Info)
        );
        Ok(result)
    }
}

/// Passes for `https`, fails otherwise
pub fn check_protocol(url: &Url) -> Check {
    if is_https(url) {
        Check::new("protocol", CheckStatus::Pass, "Site uses HTTPS")
    } else {
        Check::new("protocol", CheckStatus::Fail, "Site does not use HTTPS")
            .detail(format!("Target uses {}://", url.scheme()))
            .fix("Serve the site over HTTPS and redirect plain HTTP requests.")
    }
}

/// Passes if the host resolves to at least one address
pub async fn check_dns(url: &Url, timeout: Duration) -> Check {
    let Some(host) = url.host_str() else {
        return Check::new("dns", CheckStatus::Fail, "Hostname does not resolve")
            .detail("URL has no host");
    };
    let port = url.port_or_known_default().unwrap_or(443);

    let lookup = tokio::net::lookup_host(format!("{}:{}", host, port));
    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(mut addrs)) => match addrs.next() {
            Some(addr) => Check::new("dns", CheckStatus::Pass, "Hostname resolves")
                .detail(format!("{} resolves to {}", host, addr.ip())),
            None => Check::new("dns", CheckStatus::Fail, "Hostname does not resolve")
                .detail(format!("{} returned no addresses", host))
                .fix("Check the domain's A/AAAA records."),
        },
        Ok(Err(e)) => {
            tracing::debug!("DNS lookup for {} failed: {}", host, e);
            Check::new("dns", CheckStatus::Fail, "Hostname does not resolve")
                .detail(e.to_string())
                .fix("Check the domain's A/AAAA records.")
        }
        Err(_) => Check::new("dns", CheckStatus::Fail, "Hostname does not resolve")
            .detail(format!("DNS lookup timed out after {}s", timeout.as_secs()))
            .fix("Check the domain's name servers."),
    }
}

/// `info` when robots.txt is served, `warn` when it is not
pub async fn check_robots(client: &Client, url: &Url) -> Check {
    match fetch_robots(client, url).await {
        Ok(RobotsFetch::Found(policy)) => {
            Check::new("robots", CheckStatus::Info, "robots.txt reachable").detail(policy.describe())
        }
        Ok(RobotsFetch::Status(status)) => {
            Check::new("robots", CheckStatus::Warn, "robots.txt not reachable")
                .detail(format!("robots.txt returned HTTP {}", status))
                .fix("Serve a robots.txt so crawlers and scanners know what they may access.")
        }
        Err(e) => {
            tracing::debug!("robots.txt request for {} failed: {}", url, e);
            Check::new("robots", CheckStatus::Warn, "robots.txt not reachable")
                .detail(e.to_string())
                .fix("Make sure the server accepts connections from automated clients.")
        }
    }
}
