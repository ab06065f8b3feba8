//! Commonly imported Client Session types.

pub use crate::client::run_client_session;
pub use crate::replay::{filter_for_role, replay_history, visible_to};
