//! The Hub Coordinator: the classroom messaging hub's single source of
//! truth for live connection state and message routing.
//!
//! A long-lived task owns four event streams — message, register,
//! unregister, shutdown — and drives every Registry mutation and Router
//! invocation from that one loop, so the Registry stays effectively
//! single-threaded for writes while remaining concurrently readable by
//! anything holding a [`classroom_registry::ConnectionRegistry`] reference.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod coordinator;
pub mod events;
pub mod prelude;

pub use coordinator::{spawn, HubHandle};
pub use events::{MessageEvent, RegisterEvent, UnregisterEvent};
