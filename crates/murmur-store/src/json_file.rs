//! Flat-file JSON message store.
//!
//! Every operation reads the whole document, mutates it in memory, and
//! writes the whole document back. Writes go to a sibling `.tmp` file
//! that is then renamed over the target, so readers never observe a
//! half-written document.

use std::path::PathBuf;

use murmur_types::ChatMessage;
use tokio::sync::Mutex;

use crate::document::MessageDocument;
use crate::error::StoreError;

/// A message store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`.
    ///
    /// Missing parent directories are created, and a missing file is
    /// initialized with an empty document. An existing file is left
    /// untouched but must parse.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory or file cannot be
    /// created, or [`StoreError::Serialization`] if an existing file is
    /// not a valid message document.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        if tokio::fs::try_exists(&store.path).await? {
            let existing = store.load().await?;
            tracing::info!(
                path = %store.path.display(),
                messages = existing.messages.len(),
                "Opened message store"
            );
        } else {
            store.save(&MessageDocument::default()).await?;
            tracing::info!(path = %store.path.display(), "Created empty message store");
        }

        Ok(store)
    }

    /// Append a message, assigning the next id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the document cannot be read or written.
    pub async fn append(&self, message: ChatMessage) -> Result<ChatMessage, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let stored = doc.append(message);
        self.save(&doc).await?;
        tracing::debug!(id = ?stored.id, "Appended message to file store");
        Ok(stored)
    }

    /// Read every stored message in append order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the document cannot be read.
    pub async fn read_all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.load().await?.messages)
    }

    /// Replace the text of message `id` and stamp `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or another
    /// [`StoreError`] if the document cannot be read or written.
    pub async fn update_text(
        &self,
        id: u64,
        text: &str,
        edited_at: i64,
    ) -> Result<ChatMessage, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let edited = doc.update_text(id, text, edited_at)?;
        self.save(&doc).await?;
        Ok(edited)
    }

    async fn load(&self) -> Result<MessageDocument, StoreError> {
        let bytes = tokio::fs::read(&self.path).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(MessageDocument::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, doc: &MessageDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
