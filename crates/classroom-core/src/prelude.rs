//! Prelude module - commonly used types for convenient import.
//!
//! Use `use classroom_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{ClassroomError, ClassroomResult};

// Identifiers
pub use crate::{MessageId, SessionId, UserId};

// Roles & message types
pub use crate::{MessageType, Role, is_permitted};

// Entities & wire envelopes
pub use crate::{InboundEnvelope, Message, OutboundEnvelope, SystemEvent};

// Session
pub use crate::{Session, SessionStatus};

// Validation
pub use crate::validation::{
    valid_context, valid_content_size, valid_message_type, valid_session_name, valid_user_id,
};
