//! The persisted message document and the id allocation policy shared by
//! every backend.

use murmur_types::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// On-disk layout: `{"messages": [...]}` in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDocument {
    /// Every stored message, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl MessageDocument {
    /// Next free id: one past the highest id present, scanned per write.
    pub fn next_id(&self) -> u64 {
        self.messages
            .iter()
            .filter_map(|m| m.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Append `message` under a freshly allocated id and return the stored copy.
    pub fn append(&mut self, mut message: ChatMessage) -> ChatMessage {
        message.id = Some(self.next_id());
        self.messages.push(message.clone());
        message
    }

    /// Replace the text of message `id`, stamping `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no message has that id, or
    /// [`StoreError::Rejected`] if `text` is blank.
    pub fn update_text(
        &mut self,
        id: u64,
        text: &str,
        edited_at: i64,
    ) -> Result<ChatMessage, StoreError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        message.edit(text, edited_at)?;
        Ok(message.clone())
    }
}
