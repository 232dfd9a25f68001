//! The broadcast hub: single authority for joins, new messages, edits,
//! and departures.
//!
//! # Locking
//!
//! Three independent locks are involved:
//!
//! - the registry lock, held only to change or copy membership
//! - the history lock, held only to push, edit, or copy messages
//! - the sequencer, held across a whole join or a whole post
//!
//! No send ever happens under the registry or history lock. The sequencer
//! makes each post (persist, append, snapshot, fan-out) and each join
//! (register, copy history, send history) atomic with respect to one
//! another. A joiner therefore sees every message exactly once, either in
//! its history frame or as a later broadcast, and broadcasts leave the hub
//! in the order posts acquired the sequencer.
//!
//! Every send is bounded by the hub's send timeout, and transports are
//! expected to fail fast on a full buffer. A client that stops reading is
//! dropped; it never holds the sequencer for longer than one timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use murmur_store::{MessageStore, StoreError};
use murmur_types::{
    ChatMessage, ClientFrame, ConnectionId, RejectReason, ServerFrame, Submission, normalize_text,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::connection::{Connection, TransportError};
use crate::error::{EditError, JoinError};
use crate::history::HistoryBuffer;
use crate::registry::{RegistrationHandle, Registry};

/// Upper bound on a single send when none is configured.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections that accepted the frame.
    pub delivered: usize,
    /// Connections whose send failed and that were unregistered.
    pub dropped: Vec<ConnectionId>,
}

/// Real-time fan-out hub over connections of type `C`.
///
/// One instance is owned by the server and shared (behind an [`Arc`])
/// with every handler that needs it.
#[derive(Debug)]
pub struct Hub<C> {
    registry: Registry<C>,
    history: Mutex<HistoryBuffer>,
    sequencer: Mutex<()>,
    store: Option<Arc<MessageStore>>,
    send_timeout: Duration,
}

impl<C: Connection> Hub<C> {
    /// Create a hub without persistence.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            registry: Registry::new(),
            history: Mutex::new(HistoryBuffer::new(history_capacity)),
            sequencer: Mutex::new(()),
            store: None,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Create a hub that persists every accepted message through `store`.
    pub fn with_store(history_capacity: usize, store: Arc<MessageStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(history_capacity)
        }
    }

    /// Bound every send to one connection by `timeout`. A send that
    /// exceeds it counts as failed.
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// The backing store, if any.
    pub const fn store(&self) -> Option<&Arc<MessageStore>> {
        self.store.as_ref()
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Register a connection and send it the current history.
    ///
    /// If the history frame cannot be delivered the connection is
    /// unregistered again and treated as never having joined.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] when the history frame cannot be encoded or
    /// sent.
    pub async fn on_connect(&self, conn: Arc<C>) -> Result<RegistrationHandle, JoinError> {
        let _order = self.sequencer.lock().await;

        let messages = self.history.lock().await.to_vec();
        let replayed = messages.len();
        let frame = C::Frame::from(ServerFrame::History { messages }.encode()?);

        let handle = self.registry.register(Arc::clone(&conn)).await;

        if let Err(e) = self.deliver(&conn, frame).await {
            self.registry.unregister(handle).await;
            conn.close();
            debug!(connection_id = %handle.id(), error = %e, "History delivery failed, join abandoned");
            return Err(JoinError::HistoryDelivery(e));
        }

        let connections = self.registry.len().await;
        info!(
            connection_id = %handle.id(),
            replayed,
            connections,
            "Connection joined"
        );
        Ok(handle)
    }

    /// Unregister a connection. Idempotent.
    ///
    /// Returns `false` if it was already gone (for example, dropped by a
    /// failed broadcast).
    pub async fn disconnect(&self, handle: RegistrationHandle) -> bool {
        let removed = self.registry.unregister(handle).await;
        if removed {
            let connections = self.registry.len().await;
            info!(
                connection_id = %handle.id(),
                connections,
                "Connection left"
            );
        }
        removed
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }

    /// Whether `handle` is still registered.
    pub async fn is_connected(&self, handle: RegistrationHandle) -> bool {
        self.registry.contains(handle).await
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Decode and post a raw client text frame sent by `sender`.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::Malformed`] for an undecodable frame or
    /// [`RejectReason::EmptyMessage`] for blank text. Rejections do not
    /// affect the sender's connection.
    pub async fn submit(&self, raw: &str, sender: ConnectionId) -> Result<ChatMessage, RejectReason> {
        let result = match ClientFrame::decode(raw) {
            Ok(ClientFrame::Message(submission)) => self.post(submission).await,
            Err(reason) => Err(reason),
        };
        match &result {
            Ok(message) => debug!(connection_id = %sender, id = ?message.id, "Message accepted"),
            Err(reason) => debug!(connection_id = %sender, %reason, "Frame rejected"),
        }
        result
    }

    /// Validate a submission, record it, and broadcast it.
    ///
    /// Persistence failures are logged and do not stop the broadcast; the
    /// message then carries no id.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::EmptyMessage`] for blank text. Nothing is
    /// stored or broadcast in that case.
    pub async fn post(&self, submission: Submission) -> Result<ChatMessage, RejectReason> {
        let mut message = ChatMessage::compose(submission, 0)?;

        let _order = self.sequencer.lock().await;
        // Timestamps are non-decreasing in broadcast order.
        message.timestamp = unix_now();
        let message = self.persist(message).await;

        self.history.lock().await.push(message.clone());
        let report = self.fan_out(&ServerFrame::Message(message.clone())).await;
        debug!(
            id = ?message.id,
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "Message broadcast"
        );
        Ok(message)
    }

    /// Replace the text of message `id` and broadcast an `edited` frame.
    ///
    /// With a store, the store is authoritative and the history entry is
    /// updated if still buffered. Without one, only buffered messages can
    /// be edited.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Rejected`] for blank text,
    /// [`EditError::NotFound`] for an unknown id, or
    /// [`EditError::Store`] when the store fails.
    pub async fn edit(&self, id: u64, text: &str) -> Result<ChatMessage, EditError> {
        let text = normalize_text(Some(text))?;

        let _order = self.sequencer.lock().await;
        let now = unix_now();
        let edited = if let Some(store) = &self.store {
            let edited = store.update_text(id, &text, now).await?;
            self.history.lock().await.replace(&edited);
            edited
        } else {
            self.history.lock().await.edit(id, &text, now)?
        };

        self.fan_out(&ServerFrame::Edited(edited.clone())).await;
        info!(id, "Message edited");
        Ok(edited)
    }

    /// Send an arbitrary frame to every registered connection.
    ///
    /// Connections whose send fails are unregistered. Never fails as a
    /// whole.
    pub async fn broadcast(&self, frame: &ServerFrame) -> BroadcastReport {
        let _order = self.sequencer.lock().await;
        self.fan_out(frame).await
    }

    /// Copy of the history buffer, oldest first.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.to_vec()
    }

    /// Seed the history buffer, keeping only the most recent messages
    /// that fit.
    pub async fn restore(&self, messages: Vec<ChatMessage>) {
        let mut history = self.history.lock().await;
        history.extend(messages);
        if history.is_empty() {
            debug!("No history to restore");
        } else {
            info!(restored = history.len(), "History restored");
        }
    }

    /// Seed the history buffer from the backing store, if any.
    ///
    /// Returns the number of messages now buffered.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub async fn restore_from_store(&self) -> Result<usize, StoreError> {
        if let Some(store) = &self.store {
            let messages = store.read_all().await?;
            self.restore(messages).await;
        }
        Ok(self.history.lock().await.len())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Snapshot, send to everyone concurrently, then prune and close
    /// failures.
    ///
    /// Callers must hold the sequencer.
    async fn fan_out(&self, frame: &ServerFrame) -> BroadcastReport {
        let payload = match frame.encode() {
            Ok(json) => C::Frame::from(json),
            Err(e) => {
                warn!(error = %e, "Failed to encode broadcast frame");
                return BroadcastReport::default();
            }
        };

        let targets = self.registry.snapshot().await;
        let results = join_all(targets.into_iter().map(|(handle, conn)| {
            let payload = payload.clone();
            async move {
                let result = self.deliver(&conn, payload).await;
                (handle, conn, result)
            }
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (handle, conn, result) in results {
            match result {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(e) => {
                    warn!(connection_id = %handle.id(), error = %e, "Dropping connection after failed send");
                    failed.push((handle, conn));
                }
            }
        }

        for (handle, conn) in failed {
            if self.registry.unregister(handle).await {
                report.dropped.push(handle.id());
                conn.close();
            }
        }
        report
    }

    async fn deliver(&self, conn: &C, frame: C::Frame) -> Result<(), TransportError> {
        tokio::time::timeout(self.send_timeout, conn.send(frame))
            .await
            .unwrap_or(Err(TransportError::TimedOut))
    }

    async fn persist(&self, message: ChatMessage) -> ChatMessage {
        let Some(store) = &self.store else {
            return message;
        };
        match store.append(message.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    error = %e,
                    backend = store.name(),
                    "Failed to persist message, broadcasting without id"
                );
                message
            }
        }
    }
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}
