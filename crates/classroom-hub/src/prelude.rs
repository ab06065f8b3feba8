//! Commonly imported Hub types.

pub use crate::coordinator::{spawn, HubHandle};
pub use crate::events::{MessageEvent, RegisterEvent, UnregisterEvent};
