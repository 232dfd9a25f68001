//! Shared application state for the chat server.
//!
//! [`AppState`] owns the one [`Hub`] instance for the process and the
//! compiled page templates. It is wrapped in [`Arc`](std::sync::Arc) and
//! injected into every handler via Axum's `State` extractor.

use chrono::DateTime;
use minijinja::Environment;
use murmur_hub::Hub;

use crate::ws::{DEFAULT_SEND_BUFFER, WsConnection};

/// Name under which the chat page template is registered.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Shared state for the Axum application.
pub struct AppState {
    /// The broadcast hub every `WebSocket` connection joins.
    pub hub: Hub<WsConnection>,
    templates: Environment<'static>,
    send_buffer: usize,
}

impl AppState {
    /// Build the application state around `hub`.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] if the embedded page template does
    /// not compile.
    pub fn new(hub: Hub<WsConnection>) -> Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_filter("clock", clock);
        templates.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        Ok(Self {
            hub,
            templates,
            send_buffer: DEFAULT_SEND_BUFFER,
        })
    }

    /// Set how many frames may queue per client. Raised to at least 1.
    #[must_use]
    pub fn with_send_buffer(mut self, send_buffer: usize) -> Self {
        self.send_buffer = send_buffer.max(1);
        self
    }

    /// Frames queued per client before it is dropped as too slow.
    pub const fn send_buffer(&self) -> usize {
        self.send_buffer
    }

    /// The compiled page templates.
    pub const fn templates(&self) -> &Environment<'static> {
        &self.templates
    }
}

/// Template filter: unix seconds to `HH:MM` (UTC).
fn clock(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_utc() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(3_600 + 5 * 60), "01:05");
    }

    #[test]
    fn template_compiles() {
        let state = AppState::new(Hub::new(10)).unwrap();
        assert!(state.templates().get_template(INDEX_TEMPLATE).is_ok());
        assert_eq!(state.send_buffer(), DEFAULT_SEND_BUFFER);
    }

    #[test]
    fn zero_send_buffer_is_clamped() {
        let state = AppState::new(Hub::new(10)).unwrap().with_send_buffer(0);
        assert_eq!(state.send_buffer(), 1);
    }
}
