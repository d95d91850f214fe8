use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool size
const MAX_WORKERS: usize = 1024;

/// Lower bound on the status report interval (milliseconds)
const MIN_STATUS_INTERVAL_MS: u64 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_root_url(&config.root_url)?;

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.status_interval_ms < MIN_STATUS_INTERVAL_MS {
        return Err(ConfigError::Validation(format!(
            "status_interval_ms must be >= {}ms, got {}ms",
            MIN_STATUS_INTERVAL_MS, config.status_interval_ms
        )));
    }

    Ok(())
}

/// Validates the crawl root: absolute http(s) URL with a host
fn validate_root_url(root_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url '{}': {}", root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url '{}' must use http or https, got {}",
            root_url,
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url '{}' has no host",
            root_url
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}
