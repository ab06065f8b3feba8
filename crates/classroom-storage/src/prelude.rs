//! Prelude module - commonly used types for convenient import.
//!
//! Use `use classroom_storage::prelude::*;` to import all essential types.

pub use crate::{
    Database, PersistenceWriter, StorageError, StorageReader, StorageResult, StoredMessage,
    StoredSession,
};
