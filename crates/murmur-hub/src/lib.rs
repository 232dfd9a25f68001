//! Connection registry and broadcast hub for the Murmur chat server.
//!
//! # Architecture
//!
//! ```text
//! client joins ──> Hub::on_connect ──> Registry::register
//!                                  └─> send {"type":"history"}
//! client posts ──> Hub::submit ──> validate ──> store (best effort)
//!                                           ──> HistoryBuffer::push
//!                                           ──> Registry::snapshot ──> send to all
//!                                                                  └─> unregister failures
//! client leaves ─> Hub::disconnect ──> Registry::unregister
//! ```
//!
//! # Modules
//!
//! - [`connection`] -- The [`Connection`] transport trait
//! - [`registry`] -- Concurrency-safe set of open connections
//! - [`history`] -- Bounded FIFO of recent messages
//! - [`hub`] -- Join, submit, broadcast, edit, and disconnect
//! - [`error`] -- Hub error types

pub mod connection;
pub mod error;
pub mod history;
pub mod hub;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export primary types for convenience.
pub use connection::{Connection, TransportError};
pub use error::{EditError, JoinError};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
pub use hub::{BroadcastReport, DEFAULT_SEND_TIMEOUT, Hub};
pub use registry::{RegistrationHandle, Registry};
