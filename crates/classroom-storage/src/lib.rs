//! Classroom Storage — embedded persistence for the classroom messaging hub.
//!
//! Wraps an embedded `SurrealDB` instance (`SurrealKV` in production, the
//! in-memory engine in tests) behind two narrow surfaces:
//!
//! - [`writer::PersistenceWriter`] — the single-writer queue every mutation
//!   funnels through, so persistence stays strictly ordered.
//! - [`queries::StorageReader`] — concurrent read-only queries: session
//!   lookup, active-session rehydration, and per-session message history.
//!
//! [`db::Database`] owns the connection and applies the [`schema`] on
//! connect; [`records`] holds the wire shapes that cross the `SurrealDB`
//! boundary and their conversions to/from `classroom-core` domain types.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod db;
pub mod error;
pub mod queries;
pub mod records;
mod schema;
pub mod writer;

pub use db::Database;
pub use error::{StorageError, StorageResult};
pub use queries::StorageReader;
pub use records::{StoredMessage, StoredSession};
pub use writer::PersistenceWriter;
