//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the final configuration (file + CLI overrides)
//! - Resolve the served root to a canonical directory
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The root is canonicalized once so confinement checks compare like with like

use std::io;
use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::config::{validate_config, ListenerConfig, ServerConfig, ValidationError};

/// Reasons the server cannot start.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("cannot serve {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate `config` and canonicalize its root.
pub fn prepare(mut config: ServerConfig) -> Result<ServerConfig, StartupError> {
    validate_config(&config).map_err(StartupError::Invalid)?;

    let root = config
        .serve
        .root
        .canonicalize()
        .map_err(|source| StartupError::Root {
            path: config.serve.root.clone(),
            source,
        })?;
    if !root.is_dir() {
        return Err(StartupError::NotADirectory(root));
    }

    tracing::debug!(root = %root.display(), "Resolved served root");
    config.serve.root = root;
    Ok(config)
}

/// Bind the TCP listener for `listener`.
pub async fn bind(listener: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let address = listener.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_canonicalizes_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site");
        std::fs::create_dir(&nested).unwrap();

        let mut config = ServerConfig::default();
        config.serve.root = nested.join("..").join("site");
        let prepared = prepare(config).unwrap();
        assert_eq!(prepared.serve.root, nested.canonicalize().unwrap());
    }

    #[test]
    fn test_prepare_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.serve.root = dir.path().join("missing");
        assert!(matches!(prepare(config), Err(StartupError::Root { .. })));
    }

    #[test]
    fn test_prepare_rejects_file_root() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = ServerConfig::default();
        config.serve.root = file.path().to_path_buf();
        assert!(matches!(prepare(config), Err(StartupError::NotADirectory(_))));
    }

    #[test]
    fn test_prepare_reports_validation_errors() {
        let mut config = ServerConfig::default();
        config.injection.high_water_mark = 1;
        config.observability.log_level = "loud".into();
        match prepare(config) {
            Err(StartupError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = ListenerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };
        let bound = bind(&listener).await.unwrap();
        assert_ne!(bound.local_addr().unwrap().port(), 0);
    }
}
