//! Sumi-Scan operator entry point
//!
//! A thin command-line wrapper around the library for running scans by hand:
//! ad-hoc scans of a single URL, or executing jobs from a job store.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_scan::config::{load_config, Config};
use sumi_scan::job::{JobPool, JobRunner};
use sumi_scan::scan::Scanner;
use sumi_scan::storage::open_storage;
use tracing_subscriber::EnvFilter;

/// Sumi-Scan: single-page website compliance scanner
///
/// Scans a page for accessibility, privacy and security-header issues and
/// scores the result from 0 to 100.
#[derive(Parser, Debug)]
#[command(name = "sumi-scan")]
#[command(version = "1.0.0")]
#[command(about = "Single-page website compliance scanner", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scan a single URL and print the result as JSON (no job store)
    #[arg(long, value_name = "URL", conflicts_with_all = ["job", "drain"])]
    url: Option<String>,

    /// Run one job from the job store
    #[arg(long, value_name = "ID", conflicts_with_all = ["url", "drain"])]
    job: Option<i64>,

    /// Run every queued job in the job store
    #[arg(long, conflicts_with_all = ["url", "job"])]
    drain: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        handle_url(&config, url).await
    } else if let Some(job_id) = cli.job {
        handle_job(&config, job_id).await
    } else if cli.drain {
        handle_drain(&config).await
    } else {
        bail!("nothing to do: pass --url, --job or --drain");
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scan=info,warn"),
            1 => EnvFilter::new("sumi_scan=debug,info"),
            2 => EnvFilter::new("sumi_scan=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles --url: one full scan, JSON on stdout
async fn handle_url(config: &Config, url: &str) -> anyhow::Result<()> {
    let scanner = Scanner::new(&config.scanner)?;
    let result = scanner
        .scan(url)
        .await
        .with_context(|| format!("scan of {} failed", url))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_runner(config: &Config) -> anyhow::Result<JobRunner> {
    let store = open_storage(Path::new(&config.store.database_path))?;
    Ok(JobRunner::from_config(config, Arc::new(store))?)
}

/// Handles --job: run one job to a terminal state
async fn handle_job(config: &Config, job_id: i64) -> anyhow::Result<()> {
    let runner = build_runner(config)?;
    let outcome = runner.run(job_id).await?;
    println!("Job {}: {}", job_id, outcome);
    Ok(())
}

/// Handles --drain: run all queued jobs through the worker pool
async fn handle_drain(config: &Config) -> anyhow::Result<()> {
    let runner = build_runner(config)?;
    let pool = JobPool::new(runner, config.worker.max_concurrent_jobs);

    let results = pool.drain().await?;
    let mut errors = 0;
    for (job_id, outcome) in &results {
        match outcome {
            Ok(outcome) => println!("Job {}: {}", job_id, outcome),
            Err(e) => {
                errors += 1;
                println!("Job {}: error ({})", job_id, e);
            }
        }
    }

    println!("\n{} job(s) processed, {} error(s)", results.len(), errors);
    if errors > 0 {
        bail!("{} job(s) could not be recorded", errors);
    }
    Ok(())
}
