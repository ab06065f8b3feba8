//! `SurrealDB` connection wrapper.
//!
//! The [`Database`] struct wraps an embedded `SurrealDB` connection: `SurrealKV`
//! for durable deployments, the in-memory engine for tests. Both modes apply
//! the same schema (see [`crate::schema`]) before being handed to the
//! [`crate::writer::PersistenceWriter`] and the read-side queries.
//!
//! # Connection strings
//!
//! | Mode | Connection | Backend |
//! |------|-----------|---------|
//! | Embedded (production) | `surrealkv://path/to/data` | `SurrealKV` |
//! | Embedded (tests) | `mem://` | In-memory |

use crate::error::{StorageError, StorageResult};
use crate::schema;

/// `SurrealDB` connection wrapper, namespaced to a single classroom hub instance.
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connects to an embedded `SurrealDB` backed by `SurrealKV`, persisting
    /// data under `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails, or a
    /// schema error if `DEFINE` statements fail to apply.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        let db = Self::connect(&endpoint, "main").await?;
        Ok(db)
    }

    /// Connects to an in-memory `SurrealDB` instance, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        Self::connect("mem://", "test").await
    }

    async fn connect(endpoint: &str, db_name: &str) -> StorageResult<Self> {
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(endpoint)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        db.use_ns("classroom")
            .use_db(db_name)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let database = Self { inner: db };
        schema::apply(&database).await?;
        Ok(database)
    }

    /// Returns a reference to the underlying `SurrealDB` client, for direct
    /// `SurrealQL` queries.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
