use crate::config::Config;
use crate::{ConfigError, UrlRecord};

/// Validates a parsed configuration.
///
/// Checks, in order:
/// 1. At least one seed URL, each parseable as an http(s) URL with a host
/// 2. `worker-count` is at least 1
/// 3. `retry-count` is at least 1 (one attempt always happens)
/// 4. `timeout-secs` is non-zero (fetches must be bounded)
/// 5. `max-time-secs`, when set, is non-zero
/// 6. Include/exclude patterns are non-empty strings
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.crawler.seeds {
        UrlRecord::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("seed `{}`: {}", seed, e)))?;
    }

    if config.crawler.worker_count == 0 {
        return Err(ConfigError::Validation(
            "worker-count must be at least 1".to_string(),
        ));
    }

    if config.fetch.retry_count == 0 {
        return Err(ConfigError::Validation(
            "retry-count must be at least 1".to_string(),
        ));
    }

    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be non-zero".to_string(),
        ));
    }

    if config.crawler.max_time_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max-time-secs must be non-zero when set".to_string(),
        ));
    }

    for pattern in config
        .crawler
        .include
        .iter()
        .chain(config.crawler.exclude.iter())
    {
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "empty URL pattern".to_string(),
            ));
        }
    }

    Ok(())
}
