//! Error responses.
//!
//! Every way a request can fail maps to exactly one status code here, and
//! each failure is logged at the level its severity warrants.

use std::io;
use std::path::PathBuf;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::Rejection;

/// Why a request could not be answered with a file.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("missing or malformed request target")]
    BadRequest,

    #[error("forbidden: {0}")]
    Forbidden(#[from] Rejection),

    #[error("not found")]
    NotFound,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServeError::BadRequest => StatusCode::BAD_REQUEST,
            ServeError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ServeError::Forbidden(rejection) => {
                tracing::warn!(reason = %rejection, "Rejected request path")
            }
            ServeError::Io { path, source } => {
                tracing::error!(path = %path.display(), error = %source, "Failed to open file")
            }
            other => tracing::debug!(status = status.as_u16(), error = %other, "Request failed"),
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        match self {
            ServeError::MethodNotAllowed(_) => {
                (status, [(header::ALLOW, "GET")], reason).into_response()
            }
            _ => (status, reason).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::MethodNotAllowed(Method::POST).status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ServeError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServeError::from(Rejection::Escape).status(), StatusCode::FORBIDDEN);
        assert_eq!(ServeError::NotFound.status(), StatusCode::NOT_FOUND);

        let io = ServeError::Io {
            path: PathBuf::from("/srv/a.html"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = ServeError::MethodNotAllowed(Method::DELETE).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }

    #[test]
    fn test_not_found_has_no_allow() {
        let response = ServeError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::ALLOW).is_none());
    }
}
