//! Chat server for the Murmur broadcast hub.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where each socket joins the
//!   [`Hub`](murmur_hub::Hub), receives the recent history, and then
//!   every new message
//! - **REST endpoints** for reading, posting, and editing messages
//! - **HTML chat page** (`GET /`) with a plain form fallback (`POST /send`)
//!
//! # Architecture
//!
//! One [`AppState`] per process owns the hub; the hub owns the connection
//! registry, the history buffer, and a handle to the message store
//! selected in [`MurmurConfig`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{MurmurConfig, ServerConfig};
pub use router::build_router;
pub use server::{ServerError, serve, start_server};
pub use state::AppState;
