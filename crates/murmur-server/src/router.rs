//! Axum router construction for the chat server.
//!
//! Assembles all routes (page, REST, `WebSocket`) into a single [`Router`]
//! with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the chat server.
///
/// The router includes:
/// - `GET /` -- chat page
/// - `GET /ws` -- `WebSocket` chat stream
/// - `GET /api/messages` -- stored messages
/// - `POST /api/messages` -- post a message
/// - `PATCH /api/messages/{id}` -- edit a message
/// - `POST /send` -- form post
/// - `GET /health` -- liveness
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws::ws_chat))
        .route(
            "/api/messages",
            get(handlers::list_messages).post(handlers::create_message),
        )
        .route("/api/messages/{id}", patch(handlers::edit_message))
        .route("/send", post(handlers::send_form))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
