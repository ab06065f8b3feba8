//! The classroom error taxonomy.
//!
//! One enum, one variant family per kind in the error-handling design:
//! validation, authorization, state, resource, persistence, network,
//! internal. Downstream crates wrap foreign errors (storage, I/O) in their
//! own narrower types and convert into [`ClassroomError`] at the boundary.

use thiserror::Error;

/// The unified error type for classroom-hub operations.
#[derive(Debug, Error)]
pub enum ClassroomError {
    // --- Validation: surfaced to submitter; connection stays open; no persistence. ---
    /// A user id failed the length/alphabet check.
    #[error("invalid user id: {value}")]
    InvalidUserId {
        /// The rejected raw value.
        value: String,
    },

    /// A context tag failed the length/alphabet check.
    #[error("invalid context: {value}")]
    InvalidContext {
        /// The rejected raw value.
        value: String,
    },

    /// A session name failed the length/printability check.
    #[error("invalid session name: {reason}")]
    InvalidSessionName {
        /// Why the name was rejected.
        reason: String,
    },

    /// The wire `type` field did not match one of the six known kinds.
    #[error("unknown message type: {value}")]
    UnknownMessageType {
        /// The rejected raw value.
        value: String,
    },

    /// The encoded `content` payload exceeded the 64 KiB cap.
    #[error("content too large: {bytes} bytes exceeds {max_bytes} byte limit")]
    ContentTooLarge {
        /// The encoded size that was rejected.
        bytes: usize,
        /// The maximum allowed size.
        max_bytes: usize,
    },

    /// A direct message type (`inbox_response`/`request`) had no `to_user`.
    #[error("message type {message_type} requires to_user")]
    MissingToUser {
        /// The message type that required a recipient.
        message_type: String,
    },

    /// A session was created with no students on its roster.
    #[error("session roster must contain at least one student")]
    EmptyStudentRoster,

    // --- Authorization: surfaced to submitter, or 403 at upgrade. ---
    /// The sender's role may not send this message type.
    #[error("role {role} may not send message type {message_type}")]
    RoleNotPermitted {
        /// The sender's role.
        role: String,
        /// The message type they attempted to send.
        message_type: String,
    },

    /// A student attempted to act in a session they are not a member of.
    #[error("user {user_id} is not a member of session {session_id}")]
    NotSessionMember {
        /// The user who was rejected.
        user_id: String,
        /// The session they attempted to join.
        session_id: String,
    },

    // --- State: surfaced as 404/400 at REST, or a close reason at upgrade. ---
    /// No session exists with the given id.
    #[error("session not found: {session_id}")]
    SessionNotFound {
        /// The id that was looked up.
        session_id: String,
    },

    /// The session has already transitioned to ended.
    #[error("session already ended: {session_id}")]
    SessionAlreadyEnded {
        /// The id of the already-ended session.
        session_id: String,
    },

    /// The targeted recipient of a direct message is not currently connected.
    #[error("recipient not found: {user_id} in session {session_id}")]
    RecipientNotFound {
        /// The intended recipient.
        user_id: String,
        /// The session they were expected to be connected to.
        session_id: String,
    },

    /// The sender of a message has no live Client Session.
    #[error("sender has no live connection: {user_id}")]
    SenderNotConnected {
        /// The user who attempted to send without a live connection.
        user_id: String,
    },

    // --- Resource: caller retries or drops; never crashes the hub. ---
    /// A bounded buffer (hub event queue, recipient outbound queue) was full.
    #[error("queue full: {queue}")]
    QueueFull {
        /// Which queue rejected the submission.
        queue: String,
    },

    /// The caller exceeded the allotted time waiting to enqueue a write.
    #[error("write timeout after {millis}ms")]
    WriteTimeout {
        /// How long the caller waited before giving up.
        millis: u64,
    },

    /// The sender exceeded the per-minute message cap.
    #[error("rate limit exceeded for {user_id}")]
    RateLimitExceeded {
        /// The user who was rate-limited.
        user_id: String,
    },

    // --- Persistence: message dropped; sender may get a system frame. ---
    /// A durable write failed after the single retry.
    #[error("persistence failed: {0}")]
    PersistenceFailed(String),

    // --- Network: triggers idempotent Client Session close. ---
    /// The peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// A heartbeat response was not observed within the staleness bound.
    #[error("heartbeat timeout: last seen {seconds_ago}s ago")]
    HeartbeatTimeout {
        /// Seconds since the last heartbeat was observed.
        seconds_ago: u64,
    },

    // --- Internal: logged at critical; hub continues. ---
    /// An invariant that should be structurally impossible was violated.
    #[error("internal invariant violated: {0}")]
    Internal(String),

    /// Configuration failed validation at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClassroomError {
    /// A stable, lowercase kind tag for logs and wire error codes.
    ///
    /// Mirrors the seven kinds in the error-handling design so REST
    /// handlers and close frames can map unambiguously.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ClassroomError::InvalidUserId { .. }
            | ClassroomError::InvalidContext { .. }
            | ClassroomError::InvalidSessionName { .. }
            | ClassroomError::UnknownMessageType { .. }
            | ClassroomError::ContentTooLarge { .. }
            | ClassroomError::MissingToUser { .. }
            | ClassroomError::EmptyStudentRoster => "validation",

            ClassroomError::RoleNotPermitted { .. } | ClassroomError::NotSessionMember { .. } => {
                "authorization"
            }

            ClassroomError::SessionNotFound { .. }
            | ClassroomError::SessionAlreadyEnded { .. }
            | ClassroomError::RecipientNotFound { .. }
            | ClassroomError::SenderNotConnected { .. } => "state",

            ClassroomError::QueueFull { .. }
            | ClassroomError::WriteTimeout { .. }
            | ClassroomError::RateLimitExceeded { .. } => "resource",

            ClassroomError::PersistenceFailed(_) => "persistence",

            ClassroomError::ConnectionClosed | ClassroomError::HeartbeatTimeout { .. } => {
                "network"
            }

            ClassroomError::Internal(_) | ClassroomError::Configuration(_) => "internal",
        }
    }
}

/// Result alias for classroom operations.
pub type ClassroomResult<T> = Result<T, ClassroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_cover_every_variant_family() {
        let samples = [
            ClassroomError::InvalidUserId {
                value: "x".into(),
            },
            ClassroomError::RoleNotPermitted {
                role: "student".into(),
                message_type: "request".into(),
            },
            ClassroomError::SessionNotFound {
                session_id: "x".into(),
            },
            ClassroomError::QueueFull {
                queue: "messages".into(),
            },
            ClassroomError::PersistenceFailed("disk full".into()),
            ClassroomError::ConnectionClosed,
            ClassroomError::Internal("unreachable".into()),
        ];
        let kinds: Vec<&str> = samples.iter().map(ClassroomError::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "validation",
                "authorization",
                "state",
                "resource",
                "persistence",
                "network",
                "internal",
            ]
        );
    }

    #[test]
    fn display_messages_are_informative() {
        let err = ClassroomError::RateLimitExceeded {
            user_id: "alice".into(),
        };
        assert_eq!(err.to_string(), "rate limit exceeded for alice");
    }
}
