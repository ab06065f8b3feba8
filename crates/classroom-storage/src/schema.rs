//! `SurrealQL` schema definitions for the two persisted tables.
//!
//! Mirrors the relational shape in the external interfaces: a `sessions`
//! table and a `messages` table with a record-link foreign key, status/type
//! check constraints expressed as `ASSERT`, and the two required indexes.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};

const SCHEMA: &str = "
DEFINE TABLE IF NOT EXISTS sessions SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS session_uuid ON sessions TYPE string;
DEFINE FIELD IF NOT EXISTS name ON sessions TYPE string ASSERT string::len($value) > 0 AND string::len($value) <= 200;
DEFINE FIELD IF NOT EXISTS created_by ON sessions TYPE string;
DEFINE FIELD IF NOT EXISTS student_ids ON sessions TYPE array<string>;
DEFINE FIELD IF NOT EXISTS start_time ON sessions TYPE datetime;
DEFINE FIELD IF NOT EXISTS end_time ON sessions TYPE option<datetime>;
DEFINE FIELD IF NOT EXISTS status ON sessions TYPE string ASSERT $value IN ['active', 'ended'];
DEFINE INDEX IF NOT EXISTS sessions_status ON sessions FIELDS status;

DEFINE TABLE IF NOT EXISTS messages SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS message_uuid ON messages TYPE string;
DEFINE FIELD IF NOT EXISTS session_id ON messages TYPE record<sessions>;
DEFINE FIELD IF NOT EXISTS message_type ON messages TYPE string
    ASSERT $value IN ['instructor_inbox', 'inbox_response', 'request', 'request_response', 'analytics', 'instructor_broadcast'];
DEFINE FIELD IF NOT EXISTS context ON messages TYPE string ASSERT string::len($value) >= 1 AND string::len($value) <= 50;
DEFINE FIELD IF NOT EXISTS from_user ON messages TYPE string;
DEFINE FIELD IF NOT EXISTS to_user ON messages TYPE option<string>;
DEFINE FIELD IF NOT EXISTS content ON messages TYPE string;
DEFINE FIELD IF NOT EXISTS timestamp ON messages TYPE datetime;
DEFINE INDEX IF NOT EXISTS messages_session_timestamp ON messages FIELDS session_id, timestamp;
";

/// Applies the schema `DEFINE` statements. Idempotent: safe to run on every
/// connect thanks to `IF NOT EXISTS`.
pub(crate) async fn apply(db: &Database) -> StorageResult<()> {
    db.client()
        .query(SCHEMA)
        .await
        .map_err(|e| StorageError::Internal(format!("schema apply failed: {e}")))?
        .check()
        .map_err(|e| StorageError::Internal(format!("schema apply failed: {e}")))?;
    Ok(())
}
