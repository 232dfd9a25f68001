//! Chat message and submission types.
//!
//! A [`ChatMessage`] is created from a client [`Submission`] by
//! [`ChatMessage::compose`], which is the only place the "text is never
//! empty" invariant is enforced. Once composed, a message is immutable
//! apart from [`ChatMessage::edit`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Username used when a submission carries no (or a blank) username.
pub const DEFAULT_USERNAME: &str = "Anônimo";

/// Why a submission was refused.
///
/// Rejections are local to the submitting client: nothing is stored or
/// broadcast, and the connection stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The message text was absent, empty, or whitespace only.
    #[error("message text is empty")]
    EmptyMessage,

    /// The payload could not be decoded as a known client frame.
    #[error("malformed payload")]
    Malformed,
}

/// A message posted by a client, before validation.
///
/// Shared by the `WebSocket` `message` frame, the JSON REST body, and the
/// HTML form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Submission {
    /// Display name chosen by the client.
    #[serde(default)]
    pub username: Option<String>,
    /// The message text.
    #[serde(default)]
    pub message: Option<String>,
}

impl Submission {
    /// Build a submission from a username and text.
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            message: Some(message.into()),
        }
    }
}

/// A validated chat message.
///
/// On the wire the text travels under the `message` key, matching the
/// frames browsers already send. `id` and `edited_at` are omitted when
/// unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Store-assigned identifier, absent when the message was never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Display name of the author.
    pub username: String,
    /// Message text, never empty after trimming.
    #[serde(rename = "message")]
    pub text: String,
    /// Unix seconds at which the hub accepted the message.
    pub timestamp: i64,
    /// Unix seconds of the last edit, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<i64>,
}

impl ChatMessage {
    /// Validate a submission and build a message stamped with `now`.
    ///
    /// Text and username are trimmed. A blank username becomes
    /// [`DEFAULT_USERNAME`].
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::EmptyMessage`] if the text is absent or
    /// blank.
    pub fn compose(submission: Submission, now: i64) -> Result<Self, RejectReason> {
        let text = normalize_text(submission.message.as_deref())?;
        let username = submission
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_USERNAME)
            .to_owned();

        Ok(Self {
            id: None,
            username,
            text,
            timestamp: now,
            edited_at: None,
        })
    }

    /// Replace the text and stamp `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::EmptyMessage`] if the new text is blank;
    /// the message is left unchanged.
    pub fn edit(&mut self, text: &str, now: i64) -> Result<(), RejectReason> {
        self.text = normalize_text(Some(text))?;
        self.edited_at = Some(now);
        Ok(())
    }
}

/// Trim message text, rejecting blank input.
///
/// # Errors
///
/// Returns [`RejectReason::EmptyMessage`] if `text` is `None` or blank.
pub fn normalize_text(text: Option<&str>) -> Result<String, RejectReason> {
    match text.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_owned()),
        _ => Err(RejectReason::EmptyMessage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_trims_and_keeps_username() {
        let msg = ChatMessage::compose(Submission::new(" alice ", "  hi  "), 42).unwrap();
        assert_eq!(msg.username, "alice");
        assert_eq!(msg.text, "hi");
        assert_eq!(msg.timestamp, 42);
        assert!(msg.id.is_none());
        assert!(msg.edited_at.is_none());
    }

    #[test]
    fn compose_defaults_blank_username() {
        let absent = Submission {
            username: None,
            message: Some(String::from("hello")),
        };
        assert_eq!(
            ChatMessage::compose(absent, 0).unwrap().username,
            DEFAULT_USERNAME
        );

        let blank = Submission::new("   ", "hello");
        assert_eq!(
            ChatMessage::compose(blank, 0).unwrap().username,
            DEFAULT_USERNAME
        );
    }

    #[test]
    fn compose_rejects_empty_text() {
        assert_eq!(
            ChatMessage::compose(Submission::new("bob", ""), 0),
            Err(RejectReason::EmptyMessage)
        );
        assert_eq!(
            ChatMessage::compose(Submission::new("bob", " \t\n "), 0),
            Err(RejectReason::EmptyMessage)
        );
        assert_eq!(
            ChatMessage::compose(Submission::default(), 0),
            Err(RejectReason::EmptyMessage)
        );
    }

    #[test]
    fn edit_stamps_and_rejects_blank() {
        let mut msg = ChatMessage::compose(Submission::new("bob", "first"), 10).unwrap();
        msg.edit("second ", 20).unwrap();
        assert_eq!(msg.text, "second");
        assert_eq!(msg.edited_at, Some(20));

        assert_eq!(msg.edit("  ", 30), Err(RejectReason::EmptyMessage));
        assert_eq!(msg.text, "second");
        assert_eq!(msg.edited_at, Some(20));
    }

    #[test]
    fn wire_shape_uses_message_key() {
        let msg = ChatMessage::compose(Submission::new("alice", "hi"), 1_700_000_000).unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "username": "alice",
                "message": "hi",
                "timestamp": 1_700_000_000,
            })
        );
    }
}
