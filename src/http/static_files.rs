//! Static file responses.
//!
//! # Responsibilities
//! - Stream a resolved file back with a content type guessed from its name
//! - Route HTML through the live reload injector
//! - Map filesystem failures onto 404 / 500
//!
//! # Design Decisions
//! - Nothing is buffered whole; the body is a chunk stream read on demand
//! - No `Content-Length`: HTML grows by the snippet and files may change
//!   while being read, so responses are chunked
//! - A read error after the head is sent aborts the connection

use std::path::Path;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use mime_guess::mime;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::config::ServerConfig;
use crate::http::response::ServeError;
use crate::transform::{InjectingStream, Snippet};

/// Turns resolved paths into streaming responses.
#[derive(Debug, Clone)]
pub struct StaticResponder {
    snippet: Option<Snippet>,
    high_water_mark: usize,
}

impl StaticResponder {
    /// `snippet` is `None` when live reload is off; HTML is then served as-is.
    pub fn new(snippet: Option<Snippet>, high_water_mark: usize) -> Self {
        Self {
            snippet,
            high_water_mark,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let snippet = config
            .live_reload
            .enabled
            .then(|| Snippet::for_endpoint(&config.live_reload.path));
        Self::new(snippet, config.injection.high_water_mark)
    }

    pub fn injects(&self) -> bool {
        self.snippet.is_some()
    }

    /// Respond with the file at `path`, which must already be confined to
    /// the root.
    pub async fn serve(&self, path: &Path) -> Result<Response, ServeError> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                tracing::debug!(path = %path.display(), "Not a regular file");
                return Err(ServeError::NotFound);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "File not found");
                return Err(ServeError::NotFound);
            }
        }

        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        let file = File::open(path).await.map_err(|source| ServeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let shown = path.display().to_string();
        let chunks = ReaderStream::new(file).inspect_err(move |e| {
            tracing::warn!(path = %shown, error = %e, "Read failed mid-stream, aborting response");
        });

        let is_html = content_type.type_() == mime::TEXT && content_type.subtype() == mime::HTML;
        let body = match &self.snippet {
            Some(snippet) if is_html => {
                Body::from_stream(InjectingStream::new(chunks, snippet, self.high_water_mark))
            }
            _ => Body::from_stream(chunks),
        };

        tracing::debug!(
            path = %path.display(),
            content_type = %content_type,
            inject = is_html && self.injects(),
            "Serving file"
        );
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.to_string())],
            body,
        )
            .into_response())
    }
}
