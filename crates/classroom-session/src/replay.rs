//! The History Replayer: on Authenticated entry, streams every past message
//! for the session the connecting user may see, then a terminal system
//! frame before live delivery begins.
//!
//! Split the same way the Router is: [`visible_to`] is a pure per-message
//! predicate, directly testable against the six message kinds and both
//! roles; [`replay_history`] is the thin I/O glue that fetches and sends.

use classroom_core::{Message, MessageType, OutboundEnvelope, Role, SessionId, SystemEvent, UserId};
use classroom_storage::StorageReader;
use tokio::sync::mpsc;

/// Whether `user_id` (connected as `role`) may see `message` in replay.
///
/// Instructors see everything. A student sees a message iff they authored
/// it, it was addressed to them directly, or it is an un-addressed
/// `instructor_broadcast`.
#[must_use]
pub fn visible_to(message: &Message, user_id: &UserId, role: Role) -> bool {
    match role {
        Role::Instructor => true,
        Role::Student => {
            message.from_user == *user_id
                || message.to_user.as_ref() == Some(user_id)
                || (message.to_user.is_none() && message.message_type == MessageType::InstructorBroadcast)
        },
    }
}

/// Filters a time-ordered message history down to what `user_id`/`role` may
/// see, preserving order.
#[must_use]
pub fn filter_for_role(messages: Vec<Message>, user_id: &UserId, role: Role) -> Vec<Message> {
    messages.into_iter().filter(|m| visible_to(m, user_id, role)).collect()
}

/// Streams `session_id`'s visible history to `outbound`, then a terminal
/// `history_complete`/`history_unavailable` system frame.
///
/// Uses the awaiting `send` rather than `try_send`: replay runs once at
/// connection start, before the queue has any other contender for space, so
/// blocking briefly on a full queue here is the right tradeoff over
/// silently dropping history.
pub async fn replay_history(
    reader: &StorageReader,
    session_id: SessionId,
    user_id: &UserId,
    role: Role,
    outbound: &mpsc::Sender<OutboundEnvelope>,
) {
    match reader.get_messages_for_session(session_id).await {
        Ok(messages) => {
            for message in filter_for_role(messages, user_id, role) {
                if outbound.send(message.into()).await.is_err() {
                    return;
                }
            }
            let _ = outbound
                .send(SystemEvent::HistoryComplete.into_envelope(session_id, None))
                .await;
        },
        Err(err) => {
            tracing::warn!(%session_id, error = %err, "history retrieval failed");
            let _ = outbound
                .send(SystemEvent::HistoryUnavailable.into_envelope(session_id, Some(err.to_string())))
                .await;
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use classroom_core::MessageId;

    fn uid(s: &str) -> UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    fn message(message_type: MessageType, from_user: UserId, to_user: Option<UserId>) -> Message {
        Message {
            id: MessageId::new(),
            session_id: SessionId::new(),
            message_type,
            context: "general".to_string(),
            from_user,
            to_user,
            content: serde_json::json!({}),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn instructor_sees_everything() {
        let m = message(MessageType::InstructorInbox, uid("alice"), None);
        assert!(visible_to(&m, &uid("instr1"), Role::Instructor));
    }

    #[test]
    fn student_sees_own_messages() {
        let m = message(MessageType::InstructorInbox, uid("alice"), None);
        assert!(visible_to(&m, &uid("alice"), Role::Student));
        assert!(!visible_to(&m, &uid("bob"), Role::Student));
    }

    #[test]
    fn student_sees_direct_replies_addressed_to_them() {
        let m = message(MessageType::Request, uid("instr1"), Some(uid("alice")));
        assert!(visible_to(&m, &uid("alice"), Role::Student));
        assert!(!visible_to(&m, &uid("bob"), Role::Student));
    }

    #[test]
    fn student_sees_instructor_broadcast() {
        let m = message(MessageType::InstructorBroadcast, uid("instr1"), None);
        assert!(visible_to(&m, &uid("alice"), Role::Student));
        assert!(visible_to(&m, &uid("bob"), Role::Student));
    }

    #[test]
    fn filter_preserves_order() {
        let msgs = vec![
            message(MessageType::InstructorBroadcast, uid("instr1"), None),
            message(MessageType::Analytics, uid("alice"), None),
            message(MessageType::Request, uid("instr1"), Some(uid("bob"))),
        ];
        let filtered = filter_for_role(msgs, &uid("alice"), Role::Student);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].message_type, MessageType::InstructorBroadcast);
        assert_eq!(filtered[1].message_type, MessageType::Analytics);
    }
}
