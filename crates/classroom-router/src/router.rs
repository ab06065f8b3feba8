//! `GetRecipients` and delivery: computing who a validated message goes to,
//! and enqueuing it onto their outbound queues.

use classroom_core::{Message, MessageType, OutboundEnvelope};
use classroom_registry::{ConnectionHandle, ConnectionRegistry};

use crate::error::{RouterError, RouterResult};

/// The recipient-selection rule for a message type, independent of any live
/// registry state. A pure function, directly testable against the six
/// message kinds without a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientKind {
    /// Broadcast to every instructor connected to the session.
    AllInstructors,
    /// Broadcast to every student connected to the session.
    AllStudents,
    /// Exactly one student, addressed by `to_user`.
    DirectStudent,
}

/// Maps a message type to its recipient-selection rule.
#[must_use]
pub fn recipient_kind(message_type: MessageType) -> RecipientKind {
    match message_type {
        MessageType::InstructorInbox | MessageType::RequestResponse | MessageType::Analytics => {
            RecipientKind::AllInstructors
        },
        MessageType::InstructorBroadcast => RecipientKind::AllStudents,
        MessageType::InboxResponse | MessageType::Request => RecipientKind::DirectStudent,
    }
}

/// Resolves `message`'s recipients against the live [`ConnectionRegistry`].
///
/// # Errors
///
/// Returns [`RouterError::MissingRecipient`] if a direct message type has no
/// `to_user` (should not happen past [`crate::validate::validate_message`],
/// but defended here too since this function is independently callable),
/// or [`RouterError::RecipientNotFound`] if the addressed student is not
/// currently connected to the session.
pub async fn get_recipients(
    message: &Message,
    registry: &ConnectionRegistry,
) -> RouterResult<Vec<ConnectionHandle>> {
    match recipient_kind(message.message_type) {
        RecipientKind::AllInstructors => Ok(registry.instructors_of(message.session_id).await),
        RecipientKind::AllStudents => Ok(registry.students_of(message.session_id).await),
        RecipientKind::DirectStudent => {
            let to_user = message.to_user.as_ref().ok_or(RouterError::MissingRecipient)?;
            let handle = registry
                .student_of(message.session_id, to_user)
                .await
                .ok_or(RouterError::RecipientNotFound)?;
            Ok(vec![handle])
        },
    }
}

/// A summary of a delivery attempt across every recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients whose outbound queue accepted the envelope.
    pub delivered: usize,
    /// Recipients whose outbound queue was full; the drop is logged but
    /// never aborts delivery to the others.
    pub dropped: usize,
}

/// Enqueues `message` onto every recipient's outbound queue.
///
/// A full queue for one recipient is logged at `warn` and does not prevent
/// delivery to the rest — this is the contract's explicit tie-break: a slow
/// reader never blocks the others.
pub fn deliver(message: Message, recipients: &[ConnectionHandle]) -> DeliveryReport {
    let envelope: OutboundEnvelope = message.into();
    let mut report = DeliveryReport::default();
    for recipient in recipients {
        match recipient.try_send(envelope.clone()) {
            Ok(()) => report.delivered += 1,
            Err(_) => {
                tracing::warn!(
                    user_id = %recipient.user_id(),
                    "outbound queue full, dropping message for this recipient"
                );
                report.dropped += 1;
            },
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::{MessageId, Role, SessionId, UserId};
    use tokio::sync::mpsc;

    fn uid(s: &str) -> UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    fn message(session_id: SessionId, message_type: MessageType, to_user: Option<UserId>) -> Message {
        Message {
            id: MessageId::new(),
            session_id,
            message_type,
            context: "general".to_string(),
            from_user: uid("alice"),
            to_user,
            content: serde_json::json!({}),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn recipient_kind_matches_spec_table() {
        assert_eq!(recipient_kind(MessageType::InstructorInbox), RecipientKind::AllInstructors);
        assert_eq!(recipient_kind(MessageType::RequestResponse), RecipientKind::AllInstructors);
        assert_eq!(recipient_kind(MessageType::Analytics), RecipientKind::AllInstructors);
        assert_eq!(recipient_kind(MessageType::InstructorBroadcast), RecipientKind::AllStudents);
        assert_eq!(recipient_kind(MessageType::InboxResponse), RecipientKind::DirectStudent);
        assert_eq!(recipient_kind(MessageType::Request), RecipientKind::DirectStudent);
    }

    #[tokio::test]
    async fn broadcast_to_role_excludes_sender_by_construction() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        let (tx, _rx) = mpsc::channel(8);
        let student = ConnectionHandle::new(uid("alice"), Role::Student, session_id, tx);
        registry.register(student).await.unwrap();

        // alice (student) sends instructor_inbox; recipients are instructors,
        // which alice is not registered as, so she is never echoed.
        let msg = message(session_id, MessageType::InstructorInbox, None);
        let recipients = get_recipients(&msg, &registry).await.unwrap();
        assert!(recipients.is_empty());
    }

    #[tokio::test]
    async fn direct_message_to_disconnected_student_fails() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        let msg = message(session_id, MessageType::Request, Some(uid("bob")));
        let err = get_recipients(&msg, &registry).await.unwrap_err();
        assert!(matches!(err, RouterError::RecipientNotFound));
    }

    fn filler_envelope() -> OutboundEnvelope {
        OutboundEnvelope {
            id: MessageId::new(),
            message_type: "analytics".to_string(),
            context: "general".to_string(),
            from_user: "alice".to_string(),
            to_user: None,
            session_id: SessionId::new(),
            content: serde_json::json!({}),
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivery_drops_full_queue_without_failing_others() {
        let (tx_full, _rx_full) = mpsc::channel(1);
        tx_full.try_send(filler_envelope()).ok();
        let full_recipient = ConnectionHandle::new(
            uid("full"),
            Role::Instructor,
            SessionId::new(),
            tx_full,
        );
        let (tx_ok, mut rx_ok) = mpsc::channel(4);
        let ok_recipient = ConnectionHandle::new(uid("ok"), Role::Instructor, SessionId::new(), tx_ok);

        let msg = message(SessionId::new(), MessageType::Analytics, None);
        let report = deliver(msg, &[full_recipient, ok_recipient]);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 1);
        assert!(rx_ok.try_recv().is_ok());
    }
}
