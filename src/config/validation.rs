use crate::config::types::{BatchConfig, Config, FetchConfig, InputConfig, OutputConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_batch_config(&config.batch)?;
    validate_fetch_config(&config.fetch)?;
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.sites_path.is_empty() {
        return Err(ConfigError::Validation(
            "sites_path cannot be empty".to_string(),
        ));
    }

    if config.proxies_path.is_empty() {
        return Err(ConfigError::Validation(
            "proxies_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.jobs_path.is_empty() {
        return Err(ConfigError::Validation(
            "jobs_path cannot be empty".to_string(),
        ));
    }

    if config.progress_path.is_empty() {
        return Err(ConfigError::Validation(
            "progress_path cannot be empty".to_string(),
        ));
    }

    // Both documents are whole-file replacements; sharing a path would
    // clobber one with the other.
    if config.jobs_path == config.progress_path {
        return Err(ConfigError::Validation(format!(
            "jobs_path and progress_path must differ, both are '{}'",
            config.jobs_path
        )));
    }

    Ok(())
}

fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.save_every < 1 {
        return Err(ConfigError::Validation(format!(
            "save_every must be >= 1, got {}",
            config.save_every
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if config.jitter_min_ms > config.jitter_max_ms {
        return Err(ConfigError::Validation(format!(
            "jitter_min_ms ({}) must not exceed jitter_max_ms ({})",
            config.jitter_min_ms, config.jitter_max_ms
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.per_page < 1 || config.per_page > 500 {
        return Err(ConfigError::Validation(format!(
            "per_page must be between 1 and 500, got {}",
            config.per_page
        )));
    }

    Ok(())
}
