//! The [`Message`] entity and its wire envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{MessageId, SessionId, UserId};
use crate::role::MessageType;

/// A persisted, routed message.
///
/// `id` and `timestamp` are always server-assigned; nothing in this crate
/// constructs a `Message` from wire-trusted id/timestamp fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned unique id.
    pub id: MessageId,
    /// The session this message belongs to.
    pub session_id: SessionId,
    /// One of the six routed message kinds.
    pub message_type: MessageType,
    /// Context tag; defaulted to `"general"` by validation if absent/empty.
    pub context: String,
    /// The sender, bound from the sender's authenticated Client Session.
    pub from_user: UserId,
    /// Present iff `message_type` is `inbox_response` or `request`.
    pub to_user: Option<UserId>,
    /// Opaque structured payload.
    pub content: Value,
    /// Server-assigned timestamp, monotonic within a session to the millisecond.
    pub timestamp: DateTime<Utc>,
}

/// Inbound wire envelope: what a client actually sends.
///
/// Deliberately has no `id`/`timestamp`/`from_user`/`session_id` fields —
/// those are always server-assigned, so there is no wire path that could
/// smuggle a client-supplied value into a [`Message`].
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    /// The requested message type, validated by the router.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Optional context tag.
    #[serde(default)]
    pub context: Option<String>,
    /// Optional direct recipient, required for direct message types.
    #[serde(default)]
    pub to_user: Option<String>,
    /// Opaque structured payload.
    pub content: Value,
}

/// Outbound wire envelope: what gets written to a client's socket.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEnvelope {
    /// The message id.
    pub id: MessageId,
    /// The message type.
    #[serde(rename = "type")]
    pub message_type: String,
    /// The (possibly defaulted) context tag.
    pub context: String,
    /// The sender.
    pub from_user: String,
    /// The direct recipient, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_user: Option<String>,
    /// The session this message belongs to.
    pub session_id: SessionId,
    /// The payload.
    pub content: Value,
    /// The server-assigned timestamp.
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for OutboundEnvelope {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            message_type: m.message_type.as_str().to_string(),
            context: m.context,
            from_user: m.from_user.to_string(),
            to_user: m.to_user.map(|u| u.to_string()),
            session_id: m.session_id,
            content: m.content,
            timestamp: m.timestamp,
        }
    }
}

/// Synthetic system-frame events, sent with `type="system"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    /// History replay has finished; live delivery begins now.
    HistoryComplete,
    /// History retrieval failed; live delivery begins without replay.
    HistoryUnavailable,
    /// A message the client sent could not be routed.
    MessageError,
    /// The session this client was connected to has ended.
    SessionEnded,
}

impl SystemEvent {
    /// Builds the outbound system-frame envelope for this event.
    #[must_use]
    pub fn into_envelope(self, session_id: SessionId, detail: Option<String>) -> OutboundEnvelope {
        let event_name = match self {
            SystemEvent::HistoryComplete => "history_complete",
            SystemEvent::HistoryUnavailable => "history_unavailable",
            SystemEvent::MessageError => "message_error",
            SystemEvent::SessionEnded => "session_ended",
        };
        let mut content = serde_json::json!({ "event": event_name });
        if let Some(detail) = detail {
            content["detail"] = Value::String(detail);
        }
        OutboundEnvelope {
            id: MessageId::new(),
            message_type: "system".to_string(),
            context: "general".to_string(),
            from_user: "system".to_string(),
            to_user: None,
            session_id,
            content,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_envelope_from_message_preserves_fields() {
        let uid = crate::validation::valid_user_id("alice").unwrap();
        let msg = Message {
            id: MessageId::new(),
            session_id: SessionId::new(),
            message_type: MessageType::Analytics,
            context: "general".to_string(),
            from_user: uid,
            to_user: None,
            content: serde_json::json!({"k": "v"}),
            timestamp: Utc::now(),
        };
        let env: OutboundEnvelope = msg.clone().into();
        assert_eq!(env.id, msg.id);
        assert_eq!(env.from_user, "alice");
        assert!(env.to_user.is_none());
    }

    #[test]
    fn system_event_serializes_event_name() {
        let env = SystemEvent::HistoryComplete.into_envelope(SessionId::new(), None);
        assert_eq!(env.content["event"], "history_complete");
        assert_eq!(env.message_type, "system");
    }
}
