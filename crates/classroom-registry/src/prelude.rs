//! Prelude module - commonly used types for convenient import.
//!
//! Use `use classroom_registry::prelude::*;` to import all essential types.

pub use crate::{
    ConnectionHandle, ConnectionRegistry, Membership, RateLimiter, RegistryError, RegistryResult,
    RegistryStats, SessionCache, SharedRegistry,
};
