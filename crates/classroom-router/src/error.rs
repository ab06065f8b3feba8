//! Router error types.

use classroom_core::ClassroomError;

/// Errors from message validation and recipient routing.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The message failed field-format validation.
    #[error(transparent)]
    Invalid(#[from] ClassroomError),

    /// `sender_role` is not permitted to send this message type.
    #[error("role {sender_role:?} is not permitted to send {message_type:?}")]
    NotPermitted {
        /// The sender's role.
        sender_role: classroom_core::Role,
        /// The requested message type.
        message_type: classroom_core::MessageType,
    },

    /// A direct message type (`inbox_response`/`request`) arrived with no
    /// `to_user`.
    #[error("message type requires a to_user but none was given")]
    MissingRecipient,

    /// The addressed `to_user` is not currently connected to the session.
    #[error("recipient is not currently connected to this session")]
    RecipientNotFound,

    /// Encoding the payload for size validation failed.
    #[error("failed to encode message content: {0}")]
    Encoding(String),
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
