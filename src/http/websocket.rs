//! Live reload websocket endpoint.
//!
//! # Data Flow
//! ```text
//! ClientRegistry::broadcast ──▶ ChannelSink ──▶ this task ──▶ "reload" text frame
//! ```
//!
//! # Design Decisions
//! - One task per socket; the registry never touches the socket directly
//! - Incoming frames are read only to notice the close
//! - The client is unregistered when the task ends, however it ends

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::http::server::AppState;
use crate::reload::{ChannelSink, ClientRegistry};
use crate::transform::RELOAD_MESSAGE;

/// Pending reloads per client. More than one queued reload is redundant.
const RELOAD_QUEUE_DEPTH: usize = 1;

/// Handle the websocket upgrade for live reload.
pub async fn live_reload_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry))
}

async fn handle_socket(mut socket: WebSocket, registry: ClientRegistry) {
    let (sink, mut reloads) = ChannelSink::new(RELOAD_QUEUE_DEPTH);
    let registration = registry.register_scoped(Arc::new(sink));

    loop {
        tokio::select! {
            pending = reloads.recv() => {
                if pending.is_none() {
                    break;
                }
                if let Err(e) = socket.send(Message::text(RELOAD_MESSAGE)).await {
                    tracing::debug!(client = %registration.id(), error = %e, "Reload send failed");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(client = %registration.id(), "Live reload socket closed");
}
