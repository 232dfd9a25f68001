//! `WebSocket` handler for the chat stream.
//!
//! Clients connect to `GET /ws`. The socket is split: a writer task owns
//! the write half and drains a bounded queue, and the [`WsConnection`]
//! the hub sees only pushes onto that queue. The read half feeds client
//! frames to [`Hub::submit`](murmur_hub::Hub::submit) until the peer goes
//! away or the hub drops the connection.
//!
//! Rejected frames (bad JSON, blank text) are ignored without an error
//! frame and the connection stays open.

use std::future::{Future, ready};
use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use murmur_hub::{Connection, TransportError};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::AppState;

/// Frames queued per client when none is configured.
pub const DEFAULT_SEND_BUFFER: usize = 64;

/// The hub's handle on one client socket.
///
/// Sends never wait on the peer: a full queue fails with
/// [`TransportError::Full`] and the hub drops the client.
pub struct WsConnection {
    outbound: mpsc::Sender<Message>,
    closed: Notify,
}

impl WsConnection {
    /// Wrap the sending side of a client's outbound queue.
    pub fn new(outbound: mpsc::Sender<Message>) -> Self {
        Self {
            outbound,
            closed: Notify::new(),
        }
    }

    /// Resolves once the hub has closed this connection.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }

    fn enqueue(&self, message: Message) -> Result<(), TransportError> {
        self.outbound.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

impl Connection for WsConnection {
    type Frame = Utf8Bytes;

    fn send(&self, frame: Utf8Bytes) -> impl Future<Output = Result<(), TransportError>> + Send {
        ready(self.enqueue(Message::Text(frame)))
    }

    fn close(&self) {
        self.closed.notify_one();
    }
}

/// Upgrade an HTTP request to a `WebSocket` chat connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_chat(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drain the outbound queue into the socket until it closes or a write
/// fails.
fn spawn_writer(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if let Err(e) = sink.send(message).await {
                debug!("WebSocket write failed: {e}");
                break;
            }
        }
        let _ = sink.close().await;
    })
}

/// Join the hub, pump client frames into it, and leave on disconnect.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::channel(state.send_buffer());
    let writer = spawn_writer(sink, rx);
    let conn = Arc::new(WsConnection::new(tx));

    let handle = match state.hub.on_connect(Arc::clone(&conn)).await {
        Ok(handle) => handle,
        Err(e) => {
            debug!(error = %e, "WebSocket client never joined");
            writer.abort();
            return;
        }
    };
    let connection_id = handle.id();

    loop {
        tokio::select! {
            () = conn.closed() => {
                debug!(%connection_id, "Connection dropped by hub, closing socket");
                break;
            }
            msg = stream.next() => {
                let Some(msg) = msg else {
                    debug!(%connection_id, "WebSocket stream ended");
                    break;
                };
                match msg {
                    Ok(Message::Text(text)) => {
                        // Rejections are logged by the hub; the frame is dropped.
                        let _ = state.hub.submit(text.as_str(), connection_id).await;
                    }
                    Ok(Message::Ping(data)) => {
                        if conn.enqueue(Message::Pong(data)).is_err() {
                            debug!(%connection_id, "WebSocket client not reading (pong dropped)");
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!(%connection_id, "WebSocket client sent close");
                        break;
                    }
                    Ok(Message::Binary(_) | Message::Pong(_)) => {
                        // Chat payloads are text frames only.
                    }
                    Err(e) => {
                        debug!(%connection_id, "WebSocket error: {e}");
                        break;
                    }
                }
            }
        }
    }

    state.hub.disconnect(handle).await;
    writer.abort();
}
