//! Full-scan tests against a mock HTTP server

use crate::common::{fast_config, good_page, poor_page};
use std::time::Duration;
use sumi_scan::config::ScannerConfig;
use sumi_scan::robots::{fetch_robots, RobotsFetch};
use sumi_scan::rules::SECURITY_HEADERS;
use sumi_scan::{RiskLevel, ScanError, Scanner, Severity};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn issue_ids(result: &sumi_scan::ScanResult) -> Vec<&str> {
    result.issues.iter().map(|issue| issue.id.as_str()).collect()
}

#[tokio::test]
async fn test_poor_http_page_is_critical() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(poor_page()))
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(&ScannerConfig::default()).unwrap();
    let result = scanner.scan(&mock_server.uri()).await.unwrap();

    let ids = issue_ids(&result);
    for expected in [
        "a11y-img-alt",
        "a11y-missing-h1",
        "sec-https",
        "sec-header-hsts",
        "sec-header-csp",
        "sec-header-xfo",
        "sec-header-xcto",
        "gdpr-cookie-consent",
        "gdpr-privacy-policy",
    ] {
        assert!(ids.contains(&expected), "missing {} in {:?}", expected, ids);
    }

    let alt = result
        .issues
        .iter()
        .find(|issue| issue.id == "a11y-img-alt")
        .unwrap();
    assert_eq!(alt.severity, Severity::Critical);

    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert_eq!(result.status_code, 200);
    assert!(result.summary.critical >= 2);
}

#[tokio::test]
async fn test_headers_are_read_from_response() {
    let mock_server = MockServer::start().await;

    let mut response = ResponseTemplate::new(200).set_body_string(good_page());
    for header in SECURITY_HEADERS {
        response = response.insert_header(header.name, "set");
    }
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(response)
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(&ScannerConfig::default()).unwrap();
    let result = scanner.scan(&mock_server.uri()).await.unwrap();

    // Plain HTTP is the only remaining finding
    assert_eq!(issue_ids(&result), vec!["sec-https"]);
    assert_eq!(result.score, 80);
    assert_eq!(result.risk_level, RiskLevel::Critical);
}

#[tokio::test]
async fn test_non_2xx_is_fetch_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(&ScannerConfig::default()).unwrap();
    let err = scanner.scan(&mock_server.uri()).await.unwrap_err();

    assert!(matches!(err, ScanError::FetchStatus { status: 403, .. }));
    assert_eq!(err.to_string(), "FETCH_FAILED_403");
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(good_page())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(&fast_config().scanner).unwrap();
    let err = scanner.scan(&mock_server.uri()).await.unwrap_err();

    assert!(matches!(err, ScanError::Timeout { secs: 1, .. }));
    assert!(err
        .to_string()
        .starts_with("Request timed out after 1s: http://127.0.0.1"));
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(good_page()))
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(&ScannerConfig::default()).unwrap();
    let result = scanner
        .scan(&format!("{}/old", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(result.url, format!("{}/new", mock_server.uri()));
}

#[tokio::test]
async fn test_redirect_limit_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/b"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/c"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(good_page()))
        .mount(&mock_server)
        .await;

    let config = ScannerConfig {
        max_redirects: 1,
        ..ScannerConfig::default()
    };
    let scanner = Scanner::new(&config).unwrap();
    let err = scanner
        .scan(&format!("{}/a", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Network { .. }));
    assert!(err.to_string().starts_with("Failed to fetch "));
}

#[tokio::test]
async fn test_browser_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(good_page()))
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(&ScannerConfig::default()).unwrap();
    scanner.scan(&mock_server.uri()).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let agent = requests[0]
        .headers
        .get(&"user-agent".parse().unwrap())
        .map(|values| values.as_str().to_string())
        .unwrap_or_default();
    assert!(agent.starts_with("Mozilla/5.0"), "unexpected agent {}", agent);
}

#[tokio::test]
async fn test_fetch_robots_from_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: *\nDisallow: /admin\n\nSitemap: https://example.com/sitemap.xml\n",
        ))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let site = Url::parse(&mock_server.uri()).unwrap();
    let fetched = fetch_robots(&client, &site).await.unwrap();

    let RobotsFetch::Found(policy) = fetched else {
        panic!("expected robots.txt to be found, got {:?}", fetched);
    };
    assert!(!policy.blocks_all_crawlers());
    assert!(!policy.is_allowed("https://example.com/admin/users", "sumi-scan"));
    assert_eq!(policy.sitemaps(), vec!["https://example.com/sitemap.xml"]);
}

#[tokio::test]
async fn test_fetch_robots_missing() {
    let mock_server = MockServer::start().await;

    let client = reqwest::Client::new();
    let site = Url::parse(&mock_server.uri()).unwrap();
    let fetched = fetch_robots(&client, &site).await.unwrap();

    assert!(matches!(fetched, RobotsFetch::Status(404)));
}
