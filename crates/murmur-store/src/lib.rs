//! Message store for the Murmur chat hub.
//!
//! The hub treats persistence as an opaque `append` / `read_all` (plus
//! `update_text` for edits) collaborator. Two interchangeable backends are
//! provided:
//!
//! - [`JsonFileStore`] -- whole-document JSON file rewritten atomically
//!   on every change
//! - [`MemoryStore`] -- process memory only
//!
//! [`MessageStore`] dispatches between them.
//!
//! Both backends allocate ids as `max(existing) + 1`.

pub mod document;
pub mod error;
pub mod json_file;
pub mod memory;

use murmur_types::ChatMessage;

pub use document::MessageDocument;
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A message store backend.
#[derive(Debug)]
pub enum MessageStore {
    /// Flat JSON file on disk.
    JsonFile(JsonFileStore),
    /// Process memory.
    Memory(MemoryStore),
}

impl MessageStore {
    /// Append a message and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails to persist the message.
    pub async fn append(&self, message: ChatMessage) -> Result<ChatMessage, StoreError> {
        match self {
            Self::JsonFile(store) => store.append(message).await,
            Self::Memory(store) => Ok(store.append(message).await),
        }
    }

    /// Read every stored message in append order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    pub async fn read_all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        match self {
            Self::JsonFile(store) => store.read_all().await,
            Self::Memory(store) => Ok(store.read_all().await),
        }
    }

    /// Replace the text of message `id` and stamp `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or another
    /// [`StoreError`] if the backend fails.
    pub async fn update_text(
        &self,
        id: u64,
        text: &str,
        edited_at: i64,
    ) -> Result<ChatMessage, StoreError> {
        match self {
            Self::JsonFile(store) => store.update_text(id, text, edited_at).await,
            Self::Memory(store) => store.update_text(id, text, edited_at).await,
        }
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JsonFile(_) => "json_file",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<JsonFileStore> for MessageStore {
    fn from(store: JsonFileStore) -> Self {
        Self::JsonFile(store)
    }
}

impl From<MemoryStore> for MessageStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}
