//! Message validation and recipient routing for the classroom messaging hub.
//!
//! Two independently testable pure stages: [`validate::validate_message`]
//! turns a raw inbound envelope into a server-stamped [`classroom_core::Message`]
//! or rejects it, and [`router::get_recipients`]/[`router::deliver`] compute
//! who that message goes to and enqueue it onto their outbound queues.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod prelude;
pub mod router;
pub mod validate;

pub use error::{RouterError, RouterResult};
pub use router::{deliver, get_recipients, recipient_kind, DeliveryReport, RecipientKind};
pub use validate::{validate_message, SenderContext};
