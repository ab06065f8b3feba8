//! Test fixtures for common classroom domain types.

use classroom_core::{
    InboundEnvelope, Message, MessageId, MessageType, Session, SessionId, UserId,
};

/// Builds a validated `UserId` from a raw string, panicking if it is not a
/// legal id. For test code only — production code must go through
/// [`classroom_core::validation::valid_user_id`] and handle the error.
#[must_use]
pub fn test_user_id(raw: &str) -> UserId {
    classroom_core::validation::valid_user_id(raw)
        .unwrap_or_else(|e| panic!("invalid test user id {raw:?}: {e}"))
}

/// A default instructor id, `"instructor1"`.
#[must_use]
pub fn test_instructor_id() -> UserId {
    test_user_id("instructor1")
}

/// A default student id, `"student1"`.
#[must_use]
pub fn test_student_id() -> UserId {
    test_user_id("student1")
}

/// An active session named `"Test Session"`, created by [`test_instructor_id`]
/// with a single student, [`test_student_id`].
#[must_use]
pub fn test_session() -> Session {
    Session::new(
        "Test Session".to_string(),
        test_instructor_id(),
        vec![test_student_id()],
    )
}

/// An active session with an explicit name, instructor, and roster.
#[must_use]
pub fn test_session_named(name: &str, created_by: UserId, student_ids: Vec<UserId>) -> Session {
    Session::new(name.to_string(), created_by, student_ids)
}

/// A message in `session_id` of the given type, authored by `from_user`,
/// with `content` as an opaque JSON payload. `to_user` is left unset; use
/// [`test_direct_message`] for the two direct-reply message types.
#[must_use]
pub fn test_message(session_id: SessionId, message_type: MessageType, from_user: UserId) -> Message {
    Message {
        id: MessageId::new(),
        session_id,
        message_type,
        context: "general".to_string(),
        from_user,
        to_user: None,
        content: serde_json::json!({ "body": "test message" }),
        timestamp: chrono::Utc::now(),
    }
}

/// A direct message (`inbox_response` or `request`) addressed to `to_user`.
#[must_use]
pub fn test_direct_message(
    session_id: SessionId,
    message_type: MessageType,
    from_user: UserId,
    to_user: UserId,
) -> Message {
    Message {
        to_user: Some(to_user),
        ..test_message(session_id, message_type, from_user)
    }
}

/// A raw inbound envelope as a client would send it, with a default
/// `{"body": "test message"}` content payload.
#[must_use]
pub fn test_inbound_envelope(message_type: &str, to_user: Option<&str>) -> InboundEnvelope {
    InboundEnvelope {
        message_type: message_type.to_string(),
        context: None,
        to_user: to_user.map(str::to_string),
        content: serde_json::json!({ "body": "test message" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_has_one_student() {
        let session = test_session();
        assert_eq!(session.student_ids().len(), 1);
        assert!(session.is_active());
    }

    #[test]
    fn test_direct_message_carries_to_user() {
        let session = test_session();
        let msg = test_direct_message(
            session.id(),
            MessageType::Request,
            test_instructor_id(),
            test_student_id(),
        );
        assert_eq!(msg.to_user, Some(test_student_id()));
    }

    #[test]
    fn test_inbound_envelope_defaults_context_to_none() {
        let env = test_inbound_envelope("analytics", None);
        assert!(env.context.is_none());
        assert!(env.to_user.is_none());
    }
}
