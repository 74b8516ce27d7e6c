//! HTTP fetch implementation
//!
//! This module handles the one network request a full scan makes:
//! - Building an HTTP client that looks like a regular desktop browser
//! - A GET with a hard timeout that aborts the in-flight request
//! - Following redirects up to a configured limit
//! - Error classification into status, timeout and network failures

use crate::config::ScannerConfig;
use crate::url::normalize_target;
use crate::ScanError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Raw response body
    pub html: String,
    /// HTTP status code (always 2xx)
    pub status_code: u16,
    /// Response headers (lookups are case-insensitive)
    pub headers: HeaderMap,
    /// Time from request start until the body was read
    pub response_time: Duration,
    /// Final URL after redirects
    pub url: Url,
}

/// Builds an HTTP client with a browser-like header set
///
/// The client's own timeout matches the configured fetch timeout, so a stalled
/// body read is cut off as well as a stalled connect.
///
/// # Example
///
/// ```no_run
/// use sumi_scan::config::ScannerConfig;
/// use sumi_scan::fetcher::build_http_client;
///
/// let client = build_http_client(&ScannerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScannerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(config.user_agent())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single page for scanning
///
/// # Request Flow
///
/// 1. Normalize the target (bare hosts become `https://`)
/// 2. Send a GET, following redirects
/// 3. Abort after `timeout` has elapsed
/// 4. Reject non-2xx responses
/// 5. Read the body as text
///
/// # Error Mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | Unparseable target | `ScanError::InvalidUrl` |
/// | HTTP status outside 2xx | `ScanError::FetchStatus` (`FETCH_FAILED_<code>`) |
/// | Timeout elapsed | `ScanError::Timeout` |
/// | Anything else (DNS, TLS, connect, redirect limit) | `ScanError::Network` |
pub async fn fetch_page(
    client: &Client,
    target: &str,
    timeout: Duration,
) -> Result<FetchedPage, ScanError> {
    let url = normalize_target(target)?;
    let started = Instant::now();

    let outcome = match tokio::time::timeout(timeout, send_request(client, &url)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            return Err(ScanError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            })
        }
    };

    match outcome {
        Ok(RawResponse::Body {
            final_url,
            status_code,
            headers,
            html,
        }) => {
            let response_time = started.elapsed();
            tracing::debug!(
                "Fetched {} ({}) in {}ms",
                final_url,
                status_code,
                response_time.as_millis()
            );
            Ok(FetchedPage {
                html,
                status_code,
                headers,
                response_time,
                url: final_url,
            })
        }
        Ok(RawResponse::Status(status)) => Err(ScanError::FetchStatus {
            url: url.to_string(),
            status,
        }),
        Err(e) if e.is_timeout() => Err(ScanError::Timeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        }),
        Err(e) => Err(ScanError::Network {
            url: url.to_string(),
            source: e,
        }),
    }
}

/// What came back from the wire, before error classification
enum RawResponse {
    Status(u16),
    Body {
        final_url: Url,
        status_code: u16,
        headers: HeaderMap,
        html: String,
    },
}

async fn send_request(client: &Client, url: &Url) -> Result<RawResponse, reqwest::Error> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Ok(RawResponse::Status(status.as_u16()));
    }

    let final_url = response.url().clone();
    let headers = response.headers().clone();
    let html = response.text().await?;
    Ok(RawResponse::Body {
        final_url,
        status_code: status.as_u16(),
        headers,
        html,
    })
}
