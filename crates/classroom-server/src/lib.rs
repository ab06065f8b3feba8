//! Network boundary for the classroom messaging hub.
//!
//! Wires the REST API (`rest`) and the `/ws` upgrade (`ws`) behind one
//! [`state::AppState`], and exposes [`startup::run`] to bring the whole
//! process up: configuration, storage, the Hub Coordinator, and the HTTP
//! listener.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod rest;
pub mod startup;
pub mod state;
pub mod ws;

pub use startup::{run, RunningServer};
pub use state::AppState;
