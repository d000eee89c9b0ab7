//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: live reload socket plus a file-serving fallback
//! - Wire up middleware (request ID, tracing, metrics)
//! - Start the change notifier alongside the listener
//! - Serve until the shutdown signal fires

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::request::{make_request_span, track_requests};
use crate::http::response::ServeError;
use crate::http::static_files::StaticResponder;
use crate::http::websocket::live_reload_handler;
use crate::reload::{ChangeNotifier, ClientRegistry};
use crate::routing::PathResolver;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PathResolver>,
    pub responder: Arc<StaticResponder>,
    pub registry: ClientRegistry,
}

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Development file server.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    registry: ClientRegistry,
}

impl HttpServer {
    /// Create a server for an already prepared configuration.
    ///
    /// `config.serve.root` is expected to be canonical; see
    /// `lifecycle::startup::prepare`.
    pub fn new(config: ServerConfig) -> Self {
        let registry = ClientRegistry::new();
        let state = AppState {
            resolver: Arc::new(PathResolver::new(
                config.serve.root.clone(),
                config.serve.index_file.clone(),
            )),
            responder: Arc::new(StaticResponder::from_config(&config)),
            registry: registry.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.live_reload.enabled {
            router = router.route(&config.live_reload.path, get(live_reload_handler));
        }

        router
            .fallback(serve_handler)
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// The change notifier runs for exactly as long as this future.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;

        let _notifier = if self.config.live_reload.enabled {
            let root = &self.config.serve.root;
            let mut notifier =
                ChangeNotifier::new(root, self.config.live_reload.trigger, self.registry.clone());
            notifier.start().map_err(|source| ServerError::Watch {
                path: root.clone(),
                source,
            })?;
            Some(notifier)
        } else {
            None
        };

        tracing::info!(
            address = %addr,
            root = %self.config.serve.root.display(),
            live_reload = self.config.live_reload.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Registry of connected live reload clients.
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }
}

/// Fallback handler: every non-websocket request is a file request.
async fn serve_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    match serve_file(&state, &method, &uri).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn serve_file(state: &AppState, method: &Method, uri: &Uri) -> Result<Response, ServeError> {
    if method != Method::GET {
        return Err(ServeError::MethodNotAllowed(method.clone()));
    }

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|target| target.starts_with('/'))
        .ok_or(ServeError::BadRequest)?;

    let path = state.resolver.resolve(target)?;
    state.responder.serve(&path).await
}
