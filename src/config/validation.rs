//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (high-water mark, log level)
//! - Reject websocket paths that cannot be embedded in the client snippet
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// Smallest accepted injection high-water mark, in bytes.
pub const MIN_HIGH_WATER_MARK: usize = 64;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("serve.root must not be empty")]
    EmptyRoot,

    #[error("serve.index_file {0:?} must be a plain file name")]
    InvalidIndexFile(String),

    #[error("live_reload.path {0:?} must start with '/' and use only [A-Za-z0-9/_.-]")]
    InvalidReloadPath(String),

    #[error("injection.high_water_mark {0} is below the minimum of {min} bytes", min = MIN_HIGH_WATER_MARK)]
    HighWaterMarkTooSmall(usize),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.serve.root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRoot);
    }

    let index = &config.serve.index_file;
    if index.is_empty() || index == "." || index == ".." || index.contains(&['/', '\\', '\0'][..]) {
        errors.push(ValidationError::InvalidIndexFile(index.clone()));
    }

    if !is_valid_reload_path(&config.live_reload.path) {
        errors.push(ValidationError::InvalidReloadPath(config.live_reload.path.clone()));
    }

    if config.injection.high_water_mark < MIN_HIGH_WATER_MARK {
        errors.push(ValidationError::HighWaterMarkTooSmall(config.injection.high_water_mark));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The path is interpolated into a JS string literal, so keep it boring.
fn is_valid_reload_path(path: &str) -> bool {
    path.len() > 1
        && path.starts_with('/')
        && !path.contains("//")
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '.' | '-'))
}
