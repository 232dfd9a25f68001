//! Error types for the broadcast hub.

use murmur_store::StoreError;
use murmur_types::RejectReason;

use crate::connection::TransportError;

/// A new connection could not be admitted.
///
/// The connection is not registered when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    /// The history frame could not be encoded.
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    /// Sending the history frame failed.
    #[error("failed to deliver history: {0}")]
    HistoryDelivery(#[from] TransportError),
}

/// An edit was refused.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The replacement text was blank.
    #[error("edit rejected: {0}")]
    Rejected(#[from] RejectReason),

    /// No message with that id is known.
    #[error("message {0} not found")]
    NotFound(u64),

    /// The message store failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EditError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Rejected(reason) => Self::Rejected(reason),
            other => Self::Store(other),
        }
    }
}
