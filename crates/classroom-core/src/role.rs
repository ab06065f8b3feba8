//! Roles, message types, and the static permission matrix between them.

use serde::{Deserialize, Serialize};

/// A participant's role within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A student participant; restricted to the student-facing message types.
    Student,
    /// An instructor participant; restricted to the instructor-facing message types.
    Instructor,
}

/// The six message kinds the hub brokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Student to instructor, broadcast to every instructor in the session.
    InstructorInbox,
    /// Instructor to a single student, replying to an inbox message.
    InboxResponse,
    /// Student to instructor, broadcast to every instructor in the session.
    Request,
    /// Instructor to a single student, replying to a request.
    RequestResponse,
    /// Student to instructor, broadcast to every instructor in the session.
    Analytics,
    /// Instructor to every student in the session.
    InstructorBroadcast,
}

impl MessageType {
    /// All six message kinds.
    pub const ALL: [MessageType; 6] = [
        MessageType::InstructorInbox,
        MessageType::InboxResponse,
        MessageType::Request,
        MessageType::RequestResponse,
        MessageType::Analytics,
        MessageType::InstructorBroadcast,
    ];

    /// Whether this message type carries an explicit `to_user`.
    ///
    /// True for the two direct-reply/direct-request kinds; false for the
    /// three broadcast-to-role kinds.
    #[must_use]
    pub fn requires_to_user(self) -> bool {
        matches!(self, MessageType::InboxResponse | MessageType::Request)
    }

    /// The wire string for this message type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::InstructorInbox => "instructor_inbox",
            MessageType::InboxResponse => "inbox_response",
            MessageType::Request => "request",
            MessageType::RequestResponse => "request_response",
            MessageType::Analytics => "analytics",
            MessageType::InstructorBroadcast => "instructor_broadcast",
        }
    }
}

/// Static role/message-type permission matrix.
///
/// - student -> {instructor_inbox, request_response, analytics}
/// - instructor -> {inbox_response, request, instructor_broadcast}
#[must_use]
pub fn is_permitted(role: Role, message_type: MessageType) -> bool {
    use MessageType::{
        Analytics, InboxResponse, InstructorBroadcast, InstructorInbox, Request, RequestResponse,
    };
    matches!(
        (role, message_type),
        (Role::Student, InstructorInbox)
            | (Role::Student, RequestResponse)
            | (Role::Student, Analytics)
            | (Role::Instructor, InboxResponse)
            | (Role::Instructor, Request)
            | (Role::Instructor, InstructorBroadcast)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_matrix_is_exhaustive_and_exclusive() {
        for mt in MessageType::ALL {
            let student_ok = is_permitted(Role::Student, mt);
            let instructor_ok = is_permitted(Role::Instructor, mt);
            assert_ne!(
                student_ok, instructor_ok,
                "message type {mt:?} should be permitted for exactly one role"
            );
        }
    }

    #[test]
    fn direct_message_types_require_to_user() {
        assert!(MessageType::InboxResponse.requires_to_user());
        assert!(MessageType::Request.requires_to_user());
        assert!(!MessageType::InstructorBroadcast.requires_to_user());
        assert!(!MessageType::InstructorInbox.requires_to_user());
        assert!(!MessageType::Analytics.requires_to_user());
        assert!(!MessageType::RequestResponse.requires_to_user());
    }
}
