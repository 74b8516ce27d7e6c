use crate::config::types::{Config, ProbeConfig, ScannerConfig, StoreConfig, WorkerConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scanner_config(&config.scanner)?;
    validate_probe_config(&config.probe)?;
    validate_worker_config(&config.worker)?;
    validate_store_config(&config.store)?;
    Ok(())
}

fn validate_timeout(name: &str, secs: u64) -> Result<(), ConfigError> {
    if !(1..=120).contains(&secs) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and 120 seconds, got {}",
            name, secs
        )));
    }
    Ok(())
}

/// Validates page fetch configuration
fn validate_scanner_config(config: &ScannerConfig) -> Result<(), ConfigError> {
    validate_timeout("scanner.timeout-secs", config.timeout_secs)?;

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "scanner.max-redirects must be at most 20, got {}",
            config.max_redirects
        )));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "scanner.user-agent cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_probe_config(config: &ProbeConfig) -> Result<(), ConfigError> {
    validate_timeout("probe.timeout-secs", config.timeout_secs)
}

fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_jobs < 1 || config.max_concurrent_jobs > 64 {
        return Err(ConfigError::Validation(format!(
            "worker.max-concurrent-jobs must be between 1 and 64, got {}",
            config.max_concurrent_jobs
        )));
    }
    Ok(())
}

fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store.database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
