//! The transport seam: anything that can deliver a text frame to one client.
//!
//! The hub never reads from a connection. Reading, and noticing that the
//! peer went away, is the transport's job; it reports that by calling
//! [`Hub::disconnect`](crate::Hub::disconnect).

use std::future::Future;

/// A send to one client failed. The connection is considered dead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the channel.
    #[error("connection closed")]
    Closed,

    /// The outbound buffer is full; the client stopped reading.
    #[error("outbound buffer full")]
    Full,

    /// The send did not complete within the hub's send timeout.
    #[error("send timed out")]
    TimedOut,

    /// The underlying write failed.
    #[error("send failed: {0}")]
    Send(String),
}

/// One live bidirectional channel to a client, seen from the sending side.
///
/// Implementations must be cheap to share: the registry hands out
/// `Arc<C>` clones in every snapshot.
pub trait Connection: Send + Sync + 'static {
    /// Encoded frame as the transport wants it.
    ///
    /// Built once per broadcast from the JSON text and cloned for each
    /// recipient, so cloning should not copy the payload.
    type Frame: From<String> + Clone + Send + Sync + 'static;

    /// Hand one UTF-8 JSON text frame to the transport.
    ///
    /// Should queue rather than wait on the peer. A client that is not
    /// keeping up is reported as [`TransportError::Full`]. A failure is
    /// final: the hub unregisters the connection and never retries.
    fn send(&self, frame: Self::Frame) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Called once the hub has dropped this connection after a failed
    /// send, so the transport can shut its side down.
    fn close(&self) {}
}
