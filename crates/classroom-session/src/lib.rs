//! Per-connection Client Session lifecycle (read/write/heartbeat tasks over
//! a bounded outbound queue) and role-filtered history replay.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod client;
pub mod prelude;
pub mod replay;

pub use client::run_client_session;
pub use replay::{filter_for_role, replay_history, visible_to};
