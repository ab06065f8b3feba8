//! Classroom Core - foundation types for the classroom messaging hub.
//!
//! This crate provides:
//! - Typed identifiers for sessions, messages, and users
//! - Roles, message types, and the role/type permission matrix
//! - Field-format validation (user ids, context tags, content size)
//! - The `Session` and `Message` entities and their wire envelopes
//! - The unified `ClassroomError` taxonomy

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod error;
pub mod ids;
pub mod message;
pub mod role;
pub mod session;
pub mod validation;

pub use error::{ClassroomError, ClassroomResult};
pub use ids::{MessageId, SessionId, UserId};
pub use message::{InboundEnvelope, Message, OutboundEnvelope, SystemEvent};
pub use role::{MessageType, Role, is_permitted};
pub use session::{Session, SessionStatus};
