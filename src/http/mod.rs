//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, method / target checks)
//!     → request.rs (request ID span, metrics)
//!     → routing::PathResolver (confine to root)
//!     → static_files.rs (stream file, inject into HTML)
//!     → response.rs (error → status code)
//!
//! Upgrade on the live reload path
//!     → websocket.rs (one task per client)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod static_files;
pub mod websocket;

pub use request::X_REQUEST_ID;
pub use response::ServeError;
pub use server::{AppState, HttpServer, ServerError};
pub use static_files::StaticResponder;
