//! In-memory [`Connection`] used by the hub tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::{Connection, TransportError};

/// What happens once the connection has accepted `limit` frames.
#[derive(Clone, Copy)]
enum Overflow {
    /// Fail immediately, like a full outbound channel.
    Reject,
    /// Never complete, like a socket whose peer stopped reading.
    Hang,
}

/// Records every frame it is sent; can be told to fail or to stop reading.
#[derive(Default)]
pub struct RecordingConnection {
    frames: Mutex<Vec<String>>,
    fail: AtomicBool,
    closed: AtomicBool,
    limit: Option<(usize, Overflow)>,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Accepts `limit` frames, then reports a full buffer.
    pub fn bounded(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            limit: Some((limit, Overflow::Reject)),
            ..Self::default()
        })
    }

    /// Accepts `limit` frames, then every send hangs forever.
    pub fn hanging_after(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            limit: Some((limit, Overflow::Hang)),
            ..Self::default()
        })
    }

    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Whether the hub closed this connection.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> Vec<serde_json::Value> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| serde_json::from_str(f).unwrap())
            .collect()
    }
}

impl Connection for RecordingConnection {
    type Frame = Arc<str>;

    async fn send(&self, frame: Arc<str>) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if let Some((limit, overflow)) = self.limit {
            let full = self.frames.lock().unwrap().len() >= limit;
            match overflow {
                Overflow::Reject if full => return Err(TransportError::Full),
                Overflow::Hang if full => std::future::pending::<()>().await,
                _ => {}
            }
        }
        self.frames.lock().unwrap().push(frame.to_string());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
