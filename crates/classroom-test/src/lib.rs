//! Classroom Test - shared test fixtures and fakes for the classroom
//! messaging hub.
//!
//! This crate provides fixture builders and fakes used as a dev-dependency
//! across the workspace's other crates.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! classroom-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! use classroom_test::{test_session, MockOutbound};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let session = test_session();
//!     let outbound = MockOutbound::new();
//!     // ... exercise the router/hub against `session`, assert on `outbound.sent()`
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
