//! In-memory message store.
//!
//! Same semantics as the file store without durability. Used when
//! persistence is disabled and in tests.

use murmur_types::ChatMessage;
use tokio::sync::Mutex;

use crate::document::MessageDocument;
use crate::error::StoreError;

/// A message store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<MessageDocument>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, assigning the next id.
    pub async fn append(&self, message: ChatMessage) -> ChatMessage {
        self.doc.lock().await.append(message)
    }

    /// Every stored message in append order.
    pub async fn read_all(&self) -> Vec<ChatMessage> {
        self.doc.lock().await.messages.clone()
    }

    /// Replace the text of message `id` and stamp `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no message has that id.
    pub async fn update_text(
        &self,
        id: u64,
        text: &str,
        edited_at: i64,
    ) -> Result<ChatMessage, StoreError> {
        self.doc.lock().await.update_text(id, text, edited_at)
    }
}
