//! Shared type definitions for the Murmur chat hub.
//!
//! Types defined here are used by the store, the hub, and the server, and
//! flow downstream to `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for connection identifiers
//! - [`message`] -- Chat messages, submissions, and validation
//! - [`frames`] -- JSON text frames exchanged over the `WebSocket`

pub mod frames;
pub mod ids;
pub mod message;

// Re-export all public types at crate root for convenience.
pub use frames::{ClientFrame, ServerFrame};
pub use ids::ConnectionId;
pub use message::{ChatMessage, DEFAULT_USERNAME, RejectReason, Submission, normalize_text};
