//! HTTP endpoint handlers for the chat server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Chat page rendered from the current history |
//! | `GET` | `/api/messages` | Every stored message |
//! | `POST` | `/api/messages` | Post a message (JSON) |
//! | `PATCH` | `/api/messages/{id}` | Edit a message's text |
//! | `POST` | `/send` | Post a message (HTML form), then redirect to `/` |
//! | `GET` | `/health` | Liveness plus connection and history counts |
//!
//! Every post goes through the hub, so REST and form posts reach live
//! `WebSocket` clients exactly like socket posts do.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use axum::{Form, Json};
use minijinja::context;
use murmur_types::Submission;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::{AppState, INDEX_TEMPLATE};

/// Body of `PATCH /api/messages/{id}`.
#[derive(Debug, Deserialize)]
pub struct EditBody {
    /// Replacement text.
    #[serde(default)]
    pub message: String,
}

/// Fields of the HTML post form.
#[derive(Debug, Deserialize)]
pub struct SendForm {
    /// Display name, may be blank.
    #[serde(default)]
    pub username: String,
    /// Message text.
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// GET / -- chat page
// ---------------------------------------------------------------------------

/// Render the chat page with the buffered history.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let messages = state.hub.history().await;
    let template = state.templates().get_template(INDEX_TEMPLATE)?;
    let page = template.render(context! { messages => messages })?;
    Ok(Html(page))
}

// ---------------------------------------------------------------------------
// /api/messages
// ---------------------------------------------------------------------------

/// List every stored message, or the buffered history when the hub has
/// no store.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = match state.hub.store() {
        Some(store) => store.read_all().await?,
        None => state.hub.history().await,
    };

    Ok(Json(serde_json::json!({
        "count": messages.len(),
        "messages": messages,
    })))
}

/// Post a message from a JSON body and broadcast it.
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<Submission>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.hub.post(submission).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Replace a message's text and broadcast the edit.
pub async fn edit_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<EditBody>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.hub.edit(id, &body.message).await?;
    Ok(Json(message))
}

// ---------------------------------------------------------------------------
// POST /send -- form post
// ---------------------------------------------------------------------------

/// Post a message from the HTML form and redirect back to the page.
///
/// A blank message is dropped silently; the redirect happens either way.
pub async fn send_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SendForm>,
) -> impl IntoResponse {
    if let Err(reason) = state
        .hub
        .post(Submission::new(form.username, form.message))
        .await
    {
        tracing::debug!(%reason, "Form post rejected");
    }
    Redirect::to("/")
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness with live connection and buffered message counts.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.hub.connection_count().await,
        "history": state.hub.history().await.len(),
    }))
}
