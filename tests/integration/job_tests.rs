//! Job lifecycle tests: real runner, real SQLite store, mock or unreachable sites

use crate::common::{fast_config, good_page, poor_page, start_black_hole};
use std::sync::Arc;
use sumi_scan::config::Config;
use sumi_scan::job::{JobPool, JobRunner, RunOutcome, WEBSITE_NOT_FOUND};
use sumi_scan::probe::PARTIAL_REASON;
use sumi_scan::state::ScanMode;
use sumi_scan::storage::{JobStore, SqliteStorage};
use sumi_scan::JobStatus;
use tempfile::TempDir;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_storage() -> (TempDir, Arc<SqliteStorage>) {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::new(&dir.path().join("jobs.db")).unwrap();
    (dir, Arc::new(storage))
}

fn runner(config: &Config, storage: &Arc<SqliteStorage>) -> JobRunner {
    JobRunner::from_config(config, storage.clone()).unwrap()
}

fn check_statuses(results: &serde_json::Value) -> Vec<String> {
    results["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|check| check["status"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_job_completes_with_full_scan() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(poor_page()))
        .mount(&mock_server)
        .await;

    let (_dir, storage) = create_storage();
    let website_id = storage.insert_website(&mock_server.uri()).unwrap();
    let job_id = storage.enqueue_job(Some(website_id)).unwrap();

    let outcome = runner(&Config::default(), &storage)
        .run(job_id)
        .await
        .unwrap();

    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            mode: ScanMode::Full,
            score: job.score.unwrap()
        }
    );
    assert!(job.started_at.is_some());
    assert!(job.finished_at.is_some());
    assert_eq!(job.error, None);

    let summary = job.summary.unwrap();
    assert_eq!(summary["mode"], "full");
    assert_eq!(summary["riskLevel"], "Critical");
    let top = summary["topIssues"].as_array().unwrap();
    assert!(!top.is_empty() && top.len() <= 5);

    let results = job.results.unwrap();
    assert!(results
        .as_array()
        .unwrap()
        .iter()
        .any(|issue| issue["id"] == "a11y-img-alt"));
}

#[tokio::test]
async fn test_job_without_website_fails_without_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_dir, storage) = create_storage();
    let website_id = storage.insert_website(&mock_server.uri()).unwrap();
    let job_id = storage.enqueue_job(Some(website_id)).unwrap();
    storage.delete_website(website_id).unwrap();

    let outcome = runner(&Config::default(), &storage)
        .run(job_id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            reason: WEBSITE_NOT_FOUND.to_string()
        }
    );
    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some(WEBSITE_NOT_FOUND));
    assert!(job.started_at.is_none());
    assert!(job.finished_at.is_some());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_blocked_site_completes_as_partial() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow:\n"))
        .mount(&mock_server)
        .await;

    let (_dir, storage) = create_storage();
    let website_id = storage.insert_website(&mock_server.uri()).unwrap();
    let job_id = storage.enqueue_job(Some(website_id)).unwrap();

    let outcome = runner(&Config::default(), &storage)
        .run(job_id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            mode: ScanMode::Partial,
            score: 0
        }
    );

    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.score, Some(0));
    assert_eq!(job.error.as_deref(), Some("FETCH_FAILED_403"));

    let summary = job.summary.unwrap();
    assert_eq!(summary["mode"], "partial");
    assert_eq!(summary["reason"], PARTIAL_REASON);

    // Plain HTTP fails the protocol check; loopback resolves; robots.txt is served
    assert_eq!(
        check_statuses(&job.results.unwrap()),
        vec!["fail", "pass", "info"]
    );
}

#[tokio::test]
async fn test_unresponsive_https_site_completes_as_partial() {
    let port = start_black_hole().await;

    let (_dir, storage) = create_storage();
    let website_id = storage
        .insert_website(&format!("https://127.0.0.1:{}/", port))
        .unwrap();
    let job_id = storage.enqueue_job(Some(website_id)).unwrap();

    let outcome = runner(&fast_config(), &storage).run(job_id).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            mode: ScanMode::Partial,
            score: 0
        }
    );

    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.score, Some(0));
    let error = job.error.unwrap();
    assert!(error.contains("timed out"), "unexpected error {}", error);

    let results = job.results.unwrap();
    assert_eq!(results["reason"], PARTIAL_REASON);
    assert_eq!(check_statuses(&results), vec!["pass", "pass", "warn"]);
}

#[tokio::test]
async fn test_concurrent_triggers_scan_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(good_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (_dir, storage) = create_storage();
    let website_id = storage.insert_website(&mock_server.uri()).unwrap();
    let job_id = storage.enqueue_job(Some(website_id)).unwrap();

    let first = runner(&Config::default(), &storage);
    let second = runner(&Config::default(), &storage);
    let (a, b) = tokio::join!(first.run(job_id), second.run(job_id));
    let outcomes = [a.unwrap(), b.unwrap()];

    let completed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, RunOutcome::Completed { .. }))
        .count();
    assert_eq!(completed, 1, "outcomes: {:?}", outcomes);
    assert_eq!(storage.get_job(job_id).unwrap().status, JobStatus::Completed);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_completed_job_is_not_rerun() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(good_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (_dir, storage) = create_storage();
    let website_id = storage.insert_website(&mock_server.uri()).unwrap();
    let job_id = storage.enqueue_job(Some(website_id)).unwrap();

    let runner = runner(&Config::default(), &storage);
    runner.run(job_id).await.unwrap();
    let before = storage.get_job(job_id).unwrap();

    let outcome = runner.run(job_id).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped(_)));
    assert_eq!(storage.get_job(job_id).unwrap(), before);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_pool_drains_queue() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(good_page()))
        .mount(&mock_server)
        .await;

    let (_dir, storage) = create_storage();
    let website_id = storage.insert_website(&mock_server.uri()).unwrap();
    let mut job_ids = Vec::new();
    for _ in 0..3 {
        job_ids.push(storage.enqueue_job(Some(website_id)).unwrap());
    }
    let orphan = storage.enqueue_job(None).unwrap();

    let pool = JobPool::new(runner(&Config::default(), &storage), 2);
    let results = pool.drain().await.unwrap();

    assert_eq!(results.len(), 4);
    for (job_id, outcome) in results {
        let outcome = outcome.unwrap();
        if job_id == orphan {
            assert!(matches!(outcome, RunOutcome::Failed { .. }));
        } else {
            assert!(job_ids.contains(&job_id));
            assert!(matches!(
                outcome,
                RunOutcome::Completed {
                    mode: ScanMode::Full,
                    ..
                }
            ));
        }
    }

    assert!(storage.queued_job_ids().unwrap().is_empty());
}
