//! Bounded FIFO of the most recent messages, replayed to new joiners.

use std::collections::VecDeque;

use murmur_types::ChatMessage;

use crate::error::EditError;

/// Number of messages retained when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Ring buffer of recent messages, oldest first.
///
/// Once full, every push evicts the oldest entry. Capacity is at least 1.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` messages.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, returning the evicted oldest entry if the buffer
    /// was full.
    pub fn push(&mut self, message: ChatMessage) -> Option<ChatMessage> {
        let evicted = if self.messages.len() >= self.capacity {
            self.messages.pop_front()
        } else {
            None
        };
        self.messages.push_back(message);
        evicted
    }

    /// Append many messages in order. Only the last `capacity` survive.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        for message in messages {
            self.push(message);
        }
    }

    /// Copy of the buffered messages, oldest first.
    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    /// Overwrite the buffered entry sharing `updated.id`, if still present.
    pub fn replace(&mut self, updated: &ChatMessage) -> bool {
        if updated.id.is_none() {
            return false;
        }
        match self.messages.iter_mut().find(|m| m.id == updated.id) {
            Some(entry) => {
                entry.clone_from(updated);
                true
            }
            None => false,
        }
    }

    /// Edit a buffered message in place.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if no buffered message has that id,
    /// or [`EditError::Rejected`] if `text` is blank.
    pub fn edit(&mut self, id: u64, text: &str, edited_at: i64) -> Result<ChatMessage, EditError> {
        let entry = self
            .messages
            .iter_mut()
            .find(|m| m.id == Some(id))
            .ok_or(EditError::NotFound(id))?;
        entry.edit(text, edited_at)?;
        Ok(entry.clone())
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of buffered messages.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
