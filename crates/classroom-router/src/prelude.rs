//! Commonly imported router types.

pub use crate::error::{RouterError, RouterResult};
pub use crate::router::{deliver, get_recipients, recipient_kind, DeliveryReport, RecipientKind};
pub use crate::validate::{validate_message, SenderContext};
