//! Field-format validation for identifiers, context tags, and content size.

use crate::error::ClassroomError;
use crate::ids::UserId;

const DEFAULT_CONTEXT: &str = "general";
const MAX_CONTENT_BYTES: usize = 64 * 1024;

fn is_id_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validates a user id: 1-50 chars, alphanumeric plus `_`/`-`.
pub fn valid_user_id(raw: &str) -> Result<UserId, ClassroomError> {
    if raw.is_empty() || raw.chars().count() > 50 {
        return Err(ClassroomError::InvalidUserId {
            value: raw.to_string(),
        });
    }
    if !raw.chars().all(is_id_alphabet) {
        return Err(ClassroomError::InvalidUserId {
            value: raw.to_string(),
        });
    }
    Ok(UserId::new_unchecked(raw))
}

/// Validates (and defaults) a message context tag.
///
/// An empty or absent context is rewritten to `"general"` *before*
/// validation runs.
pub fn valid_context(raw: Option<&str>) -> Result<String, ClassroomError> {
    let candidate = match raw {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_CONTEXT,
    };
    if candidate.chars().count() > 50 {
        return Err(ClassroomError::InvalidContext {
            value: candidate.to_string(),
        });
    }
    if !candidate.chars().all(is_id_alphabet) {
        return Err(ClassroomError::InvalidContext {
            value: candidate.to_string(),
        });
    }
    Ok(candidate.to_string())
}

/// Validates a session name: 1-200 printable characters.
pub fn valid_session_name(raw: &str) -> Result<(), ClassroomError> {
    let len = raw.chars().count();
    if len == 0 || len > 200 {
        return Err(ClassroomError::InvalidSessionName {
            reason: format!("length {len} outside 1..=200"),
        });
    }
    if raw.chars().any(char::is_control) {
        return Err(ClassroomError::InvalidSessionName {
            reason: "contains control characters".to_string(),
        });
    }
    Ok(())
}

/// Validates a session's student roster is non-empty.
///
/// Per the data model, a session's `student_ids` is a set of unique
/// identifiers with at least one element; de-duplication happens before
/// this check runs, so an input that collapses to zero distinct ids (or
/// that arrived with none at all) is rejected here rather than producing a
/// rosterless active session.
pub fn valid_student_ids(student_ids: &[UserId]) -> Result<(), ClassroomError> {
    if student_ids.is_empty() {
        return Err(ClassroomError::EmptyStudentRoster);
    }
    Ok(())
}

/// Validates that a message type string is one of the six known kinds.
pub fn valid_message_type(raw: &str) -> Result<crate::role::MessageType, ClassroomError> {
    use crate::role::MessageType::{
        Analytics, InboxResponse, InstructorBroadcast, InstructorInbox, Request, RequestResponse,
    };
    match raw {
        "instructor_inbox" => Ok(InstructorInbox),
        "inbox_response" => Ok(InboxResponse),
        "request" => Ok(Request),
        "request_response" => Ok(RequestResponse),
        "analytics" => Ok(Analytics),
        "instructor_broadcast" => Ok(InstructorBroadcast),
        other => Err(ClassroomError::UnknownMessageType {
            value: other.to_string(),
        }),
    }
}

/// Validates that an already-encoded content payload does not exceed 64 KiB.
pub fn valid_content_size(encoded: &[u8]) -> Result<(), ClassroomError> {
    if encoded.len() > MAX_CONTENT_BYTES {
        return Err(ClassroomError::ContentTooLarge {
            bytes: encoded.len(),
            max_bytes: MAX_CONTENT_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_roster_must_be_non_empty() {
        assert!(valid_student_ids(&[]).is_err());
        assert!(valid_student_ids(&[valid_user_id("alice").unwrap()]).is_ok());
    }

    #[test]
    fn user_id_boundaries() {
        assert!(valid_user_id(&"a".repeat(1)).is_ok());
        assert!(valid_user_id(&"a".repeat(50)).is_ok());
        assert!(valid_user_id("").is_err());
        assert!(valid_user_id(&"a".repeat(51)).is_err());
        assert!(valid_user_id("bad id").is_err());
        assert!(valid_user_id("ok_id-1").is_ok());
    }

    #[test]
    fn context_defaults_when_empty_or_absent() {
        assert_eq!(valid_context(None).unwrap(), "general");
        assert_eq!(valid_context(Some("")).unwrap(), "general");
        assert_eq!(valid_context(Some("lecture-1")).unwrap(), "lecture-1");
    }

    #[test]
    fn context_rejects_bad_alphabet_and_overlong() {
        assert!(valid_context(Some("has space")).is_err());
        assert!(valid_context(Some(&"a".repeat(51))).is_err());
        assert!(valid_context(Some(&"a".repeat(50))).is_ok());
    }

    #[test]
    fn content_size_boundary() {
        assert!(valid_content_size(&vec![0u8; 64 * 1024]).is_ok());
        assert!(valid_content_size(&vec![0u8; 64 * 1024 + 1]).is_err());
    }

    #[test]
    fn message_type_round_trips_all_variants() {
        for mt in crate::role::MessageType::ALL {
            assert_eq!(valid_message_type(mt.as_str()).unwrap(), mt);
        }
        assert!(valid_message_type("bogus").is_err());
    }

    #[test]
    fn session_name_boundaries() {
        assert!(valid_session_name("").is_err());
        assert!(valid_session_name(&"a".repeat(200)).is_ok());
        assert!(valid_session_name(&"a".repeat(201)).is_err());
    }
}
