//! Classroom Registry - live session and connection state for the
//! classroom messaging hub.
//!
//! This crate provides:
//! - The Session Cache: an in-memory index of active sessions
//! - The Connection Registry: three indexes over live client connections
//! - The Rate Limiter: per-user sliding-window message admission control
//!
//! All three are mutated exclusively from the Hub Coordinator's single
//! event loop (see `classroom-hub`) and are safe to read concurrently from
//! anywhere else.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod connections;
pub mod error;
pub mod rate_limit;
pub mod session_cache;

pub use connections::{ConnectionHandle, ConnectionRegistry, RegistryStats, SharedRegistry};
pub use error::{RegistryError, RegistryResult};
pub use rate_limit::RateLimiter;
pub use session_cache::{Membership, SessionCache};
