//! Registry error types.

use classroom_core::UserId;

/// Errors from connection registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A connection for this `user_id` is already registered; the caller
    /// must unregister it first.
    #[error("user {user_id} already has a registered connection")]
    AlreadyRegistered {
        /// The conflicting user id.
        user_id: UserId,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
