//! Read-side queries.
//!
//! These run directly against the shared [`Database`] handle and are not
//! serialized through [`crate::writer::PersistenceWriter`] — reads are safe
//! to issue concurrently with the single writer, since `SurrealDB` itself
//! serializes conflicting access at the storage-engine level.

use std::sync::Arc;

use classroom_core::{Message, Session, SessionId};

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::{StoredMessage, StoredSession, SESSIONS_TABLE};

/// Read-side query handle over a shared [`Database`] connection.
#[derive(Clone)]
pub struct StorageReader {
    db: Arc<Database>,
}

impl StorageReader {
    /// Wraps a shared database handle for read queries.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fetches a single session by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row exists, or
    /// [`StorageError::Internal`]/[`StorageError::Serialization`] on query or
    /// decode failure.
    pub async fn get_session(&self, id: SessionId) -> StorageResult<Session> {
        let row: Option<StoredSession> = self
            .db
            .client()
            .select((SESSIONS_TABLE, id.as_uuid().to_string()))
            .await?;
        row.ok_or_else(|| StorageError::NotFound(format!("session {id}")))?
            .into_session()
    }

    /// Lists every session with `status = 'active'`, ordered by
    /// `start_time`. Used to rehydrate the Session Cache on startup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] on query failure.
    pub async fn list_active_sessions(&self) -> StorageResult<Vec<Session>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM sessions WHERE status = 'active' ORDER BY start_time ASC")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let rows: Vec<StoredSession> = response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        rows.into_iter().map(StoredSession::into_session).collect()
    }

    /// Lists every message belonging to `session_id`, ordered by
    /// `timestamp` ascending. Used by the History Replayer and the session
    /// history REST endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] on query failure.
    pub async fn get_messages_for_session(
        &self,
        session_id: SessionId,
    ) -> StorageResult<Vec<Message>> {
        let record_id =
            surrealdb::RecordId::from((SESSIONS_TABLE, session_id.as_uuid().to_string()));
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM messages WHERE session_id = $sid ORDER BY timestamp ASC",
            )
            .bind(("sid", record_id))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let rows: Vec<StoredMessage> = response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        rows.into_iter()
            .map(|row| row.into_message(session_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::PersistenceWriter;

    fn uid(s: &str) -> classroom_core::UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    #[tokio::test]
    async fn list_active_sessions_excludes_ended() {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let (writer, _h) = PersistenceWriter::spawn(db.clone());
        let reader = StorageReader::new(db);

        let active = Session::new("Active".to_string(), uid("instr1"), vec![uid("alice")]);
        let active_id = active.id();
        let ended = Session::new("Ended".to_string(), uid("instr1"), vec![uid("alice")]);
        let ended_id = ended.id();
        writer.insert_session(active).await.unwrap();
        writer.insert_session(ended).await.unwrap();
        writer
            .end_session(ended_id, chrono::Utc::now())
            .await
            .unwrap();

        let sessions = reader.list_active_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id(), active_id);
    }

    #[tokio::test]
    async fn messages_for_session_are_time_ordered() {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let (writer, _h) = PersistenceWriter::spawn(db.clone());
        let reader = StorageReader::new(db);

        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        let session_id = session.id();
        writer.insert_session(session).await.unwrap();

        for i in 0..3u32 {
            let message = Message {
                id: classroom_core::MessageId::new(),
                session_id,
                message_type: classroom_core::MessageType::Analytics,
                context: "general".to_string(),
                from_user: uid("alice"),
                to_user: None,
                content: serde_json::json!({ "seq": i }),
                timestamp: chrono::Utc::now(),
            };
            writer.insert_message(message).await.unwrap();
        }

        let messages = reader.get_messages_for_session(session_id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn get_session_not_found() {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let reader = StorageReader::new(db);
        let err = reader.get_session(SessionId::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
