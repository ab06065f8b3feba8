//! `ValidateMessage`: turns a raw inbound envelope into a fully server-
//! stamped [`Message`], or rejects it.
//!
//! A pure function of its inputs — no registry or storage access — so it
//! is directly unit-testable against the permission matrix and field
//! validators in `classroom-core`.

use chrono::Utc;

use classroom_core::{
    InboundEnvelope, Message, MessageId, Role, SessionId, UserId, is_permitted, validation,
};

use crate::error::{RouterError, RouterResult};

/// The authenticated identity of the sender, bound once at connection time
/// and never re-derived from wire input.
#[derive(Debug, Clone)]
pub struct SenderContext {
    /// The sender's user id.
    pub user_id: UserId,
    /// The sender's role.
    pub role: Role,
    /// The session the sender is connected to.
    pub session_id: SessionId,
}

/// Validates `envelope` against `sender` and produces a fully server-stamped
/// [`Message`].
///
/// Implements spec step 2-3 of the routing contract: `id`/`timestamp`/
/// `from_user`/`session_id` are always server-assigned here, never taken
/// from the wire; `type`, role/type permission, `context`, and encoded
/// `content` size are all validated before persistence is attempted.
///
/// # Errors
///
/// Returns [`RouterError::Invalid`] for format violations, or
/// [`RouterError::NotPermitted`]/[`RouterError::MissingRecipient`] for
/// permission and direct-recipient violations.
pub fn validate_message(envelope: InboundEnvelope, sender: &SenderContext) -> RouterResult<Message> {
    let message_type = validation::valid_message_type(&envelope.message_type)?;

    if !is_permitted(sender.role, message_type) {
        return Err(RouterError::NotPermitted {
            sender_role: sender.role,
            message_type,
        });
    }

    let context = validation::valid_context(envelope.context.as_deref())?;

    let to_user = if message_type.requires_to_user() {
        let raw = envelope.to_user.ok_or(RouterError::MissingRecipient)?;
        Some(validation::valid_user_id(&raw)?)
    } else {
        None
    };

    let encoded =
        serde_json::to_vec(&envelope.content).map_err(|e| RouterError::Encoding(e.to_string()))?;
    validation::valid_content_size(&encoded)?;

    Ok(Message {
        id: MessageId::new(),
        session_id: sender.session_id,
        message_type,
        context,
        from_user: sender.user_id.clone(),
        to_user,
        content: envelope.content,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        validation::valid_user_id(s).unwrap()
    }

    fn sender(role: Role) -> SenderContext {
        SenderContext {
            user_id: uid("alice"),
            role,
            session_id: SessionId::new(),
        }
    }

    fn envelope(message_type: &str, to_user: Option<&str>) -> InboundEnvelope {
        InboundEnvelope {
            message_type: message_type.to_string(),
            context: None,
            to_user: to_user.map(str::to_string),
            content: serde_json::json!({"k": "v"}),
        }
    }

    #[test]
    fn valid_student_message_is_stamped() {
        let sender = sender(Role::Student);
        let session_id = sender.session_id;
        let msg = validate_message(envelope("analytics", None), &sender).unwrap();
        assert_eq!(msg.from_user, uid("alice"));
        assert_eq!(msg.session_id, session_id);
        assert_eq!(msg.context, "general");
    }

    #[test]
    fn wrong_role_is_rejected() {
        let sender = sender(Role::Student);
        let err = validate_message(envelope("instructor_broadcast", None), &sender).unwrap_err();
        assert!(matches!(err, RouterError::NotPermitted { .. }));
    }

    #[test]
    fn direct_message_without_to_user_is_rejected() {
        let sender = sender(Role::Instructor);
        let err = validate_message(envelope("request", None), &sender).unwrap_err();
        assert!(matches!(err, RouterError::MissingRecipient));
    }

    #[test]
    fn direct_message_with_to_user_is_accepted() {
        let sender = sender(Role::Instructor);
        let msg = validate_message(envelope("request", Some("bob")), &sender).unwrap();
        assert_eq!(msg.to_user, Some(uid("bob")));
    }

    #[test]
    fn oversize_content_is_rejected() {
        let sender = sender(Role::Student);
        let mut env = envelope("analytics", None);
        env.content = serde_json::json!({ "body": "a".repeat(70 * 1024) });
        let err = validate_message(env, &sender).unwrap_err();
        assert!(matches!(err, RouterError::Invalid(_)));
    }
}
