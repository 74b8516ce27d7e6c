//! Robots.txt handling module
//!
//! The partial probe uses robots.txt as a cheap reachability signal: a site
//! that blocks full-page fetches will often still serve it. When it is served,
//! its content tells us whether the site asks crawlers to stay away.

mod parser;

pub use parser::RobotsPolicy;

use crate::url::robots_url;
use crate::ScanError;
use reqwest::Client;
use url::Url;

/// Outcome of a robots.txt request that reached the server
#[derive(Debug, Clone)]
pub enum RobotsFetch {
    /// 2xx response with its body
    Found(RobotsPolicy),
    /// Any other status
    Status(u16),
}

/// Fetches `/robots.txt` on the origin of `site`
///
/// # Returns
///
/// * `Ok(RobotsFetch::Found)` - robots.txt was served
/// * `Ok(RobotsFetch::Status)` - the server answered with a non-2xx status
/// * `Err(ScanError)` - the request never completed (DNS, TLS, timeout, ...)
pub async fn fetch_robots(client: &Client, site: &Url) -> Result<RobotsFetch, ScanError> {
    let url = robots_url(site)?;
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| network_error(&url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Ok(RobotsFetch::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(|e| network_error(&url, e))?;
    Ok(RobotsFetch::Found(RobotsPolicy::from_content(&body)))
}

fn network_error(url: &Url, source: reqwest::Error) -> ScanError {
    ScanError::Network {
        url: url.to_string(),
        source,
    }
}
