//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use super::defaults::MIN_POLL_INTERVAL_MS;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("poll.interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {0}")]
    PollIntervalTooShort(u64),
    #[error("log.filter is not a valid filter directive: {0}")]
    InvalidLogFilter(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.poll.interval_ms < MIN_POLL_INTERVAL_MS {
        errors.push(ValidationError::PollIntervalTooShort(config.poll.interval_ms));
    }

    if EnvFilter::try_new(&config.log.filter).is_err() {
        errors.push(ValidationError::InvalidLogFilter(config.log.filter.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
