//! JSON text frames exchanged over the real-time channel.
//!
//! Both directions use an internally tagged `type` field:
//!
//! ```text
//! client -> server   {"type":"message","username"?:string,"message":string}
//! server -> client   {"type":"history","messages":[...]}
//!                    {"type":"message","username":..,"message":..,"timestamp":..}
//!                    {"type":"edited", ...same fields plus "edited_at"}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::message::{ChatMessage, RejectReason, Submission};

/// A frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientFrame {
    /// Post a new chat message.
    Message(Submission),
}

impl ClientFrame {
    /// Decode a client text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::Malformed`] for invalid JSON, a missing or
    /// unknown `type`, or fields of the wrong shape.
    pub fn decode(raw: &str) -> Result<Self, RejectReason> {
        serde_json::from_str(raw).map_err(|_| RejectReason::Malformed)
    }
}

/// A frame sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerFrame {
    /// Recent messages, oldest first, sent once to each new connection.
    History {
        /// The buffered messages at the moment of joining.
        messages: Vec<ChatMessage>,
    },
    /// A newly accepted message.
    Message(ChatMessage),
    /// A message whose text was replaced.
    Edited(ChatMessage),
}

impl ServerFrame {
    /// Encode the frame as a JSON text payload.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if encoding fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_message_frame() {
        let frame = ClientFrame::decode(r#"{"type":"message","username":"alice","message":"hi"}"#)
            .unwrap();
        assert_eq!(frame, ClientFrame::Message(Submission::new("alice", "hi")));
    }

    #[test]
    fn decode_message_frame_without_username() {
        let frame = ClientFrame::decode(r#"{"type":"message","message":"hi"}"#).unwrap();
        let ClientFrame::Message(submission) = frame;
        assert!(submission.username.is_none());
        assert_eq!(submission.message.as_deref(), Some("hi"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(ClientFrame::decode("not json"), Err(RejectReason::Malformed));
        assert_eq!(
            ClientFrame::decode(r#"{"type":"typing"}"#),
            Err(RejectReason::Malformed)
        );
        assert_eq!(
            ClientFrame::decode(r#"{"message":"no type"}"#),
            Err(RejectReason::Malformed)
        );
        assert_eq!(
            ClientFrame::decode(r#"{"type":"message","message":7}"#),
            Err(RejectReason::Malformed)
        );
    }

    #[test]
    fn encode_broadcast_frame() {
        let msg = ChatMessage::compose(Submission::new("alice", "hi"), 1234).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&ServerFrame::Message(msg).encode().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "message",
                "username": "alice",
                "message": "hi",
                "timestamp": 1234,
            })
        );
    }

    #[test]
    fn encode_history_frame() {
        let msg = ChatMessage::compose(Submission::new("bob", "yo"), 5).unwrap();
        let json: serde_json::Value = serde_json::from_str(
            &ServerFrame::History {
                messages: vec![msg],
            }
            .encode()
            .unwrap(),
        )
        .unwrap();
        assert_eq!(json["type"], "history");
        assert_eq!(json["messages"][0]["username"], "bob");
        assert_eq!(json["messages"][0]["message"], "yo");

        let empty = ServerFrame::History {
            messages: Vec::new(),
        }
        .encode()
        .unwrap();
        assert_eq!(empty, r#"{"type":"history","messages":[]}"#);
    }

    #[test]
    fn encode_edited_frame_carries_edit_stamp() {
        let mut msg = ChatMessage::compose(Submission::new("bob", "yo"), 5).unwrap();
        msg.id = Some(3);
        msg.edit("hey", 9).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&ServerFrame::Edited(msg).encode().unwrap()).unwrap();
        assert_eq!(json["type"], "edited");
        assert_eq!(json["id"], 3);
        assert_eq!(json["message"], "hey");
        assert_eq!(json["edited_at"], 9);
    }
}
