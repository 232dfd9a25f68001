//! Error types for the message store.

use murmur_types::RejectReason;

/// Errors that can occur in the message store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing, or renaming the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The replacement text was blank.
    #[error("edit rejected: {0}")]
    Rejected(#[from] RejectReason),

    /// No stored message carries the requested id.
    #[error("message {0} not found")]
    NotFound(u64),
}
