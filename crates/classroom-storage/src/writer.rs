//! The single-writer persistence worker.
//!
//! All writes to the embedded store funnel through one task reading a
//! bounded queue, so persistence is strictly ordered and the
//! persist-then-route guarantee only needs to wait on one acknowledgement.
//! Submitting a write never blocks the caller's own task loop for longer
//! than the queueing timeout; once queued, the worker retries once on
//! failure before giving up and reporting the error back to the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use surrealdb::RecordId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use classroom_core::{Message, Session, SessionId};

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::{self, MessageContent, SessionContent, MESSAGES_TABLE, SESSIONS_TABLE};

const QUEUE_CAPACITY: usize = 100;
const QUEUE_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(5);

enum WriteTask {
    InsertSession(Session),
    EndSession {
        id: SessionId,
        end_time: DateTime<Utc>,
    },
    InsertMessage(Message),
}

struct Job {
    task: WriteTask,
    ack: oneshot::Sender<StorageResult<()>>,
}

/// Handle to the running persistence worker.
///
/// Cheaply cloneable; every clone shares the same bounded queue and worker
/// task. Dropping every handle closes the queue, and the worker drains
/// whatever is already enqueued before returning.
#[derive(Clone)]
pub struct PersistenceWriter {
    tx: mpsc::Sender<Job>,
}

impl PersistenceWriter {
    /// Spawns the worker task against `db` and returns a handle to it along
    /// with the task's `JoinHandle`.
    ///
    /// Drop every [`PersistenceWriter`] clone and await the returned handle
    /// to shut down cleanly: the worker finishes draining its queue, then
    /// returns.
    #[must_use]
    pub fn spawn(db: Arc<Database>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(Self::run(db, rx));
        (Self { tx }, handle)
    }

    /// Persists a newly created session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriteTimeout`] if the queue stays full for 30
    /// seconds, [`StorageError::ShuttingDown`] if the worker has already
    /// stopped, or [`StorageError::RetryExhausted`] if the write failed
    /// twice.
    pub async fn insert_session(&self, session: Session) -> StorageResult<()> {
        self.submit(WriteTask::InsertSession(session)).await
    }

    /// Persists a session's end transition.
    ///
    /// # Errors
    ///
    /// See [`Self::insert_session`].
    pub async fn end_session(&self, id: SessionId, end_time: DateTime<Utc>) -> StorageResult<()> {
        self.submit(WriteTask::EndSession { id, end_time }).await
    }

    /// Persists a routed message.
    ///
    /// # Errors
    ///
    /// See [`Self::insert_session`].
    pub async fn insert_message(&self, message: Message) -> StorageResult<()> {
        self.submit(WriteTask::InsertMessage(message)).await
    }

    async fn submit(&self, task: WriteTask) -> StorageResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        let job = Job { task, ack: ack_tx };
        match tokio::time::timeout(QUEUE_TIMEOUT, self.tx.send(job)).await {
            Ok(Ok(())) => {},
            Ok(Err(_)) => return Err(StorageError::ShuttingDown),
            Err(_) => {
                return Err(StorageError::WriteTimeout {
                    millis: u64::try_from(QUEUE_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
                });
            },
        }
        ack_rx.await.map_err(|_| StorageError::ShuttingDown)?
    }

    async fn run(db: Arc<Database>, mut rx: mpsc::Receiver<Job>) {
        while let Some(Job { task, ack }) = rx.recv().await {
            let result = Self::execute_with_retry(&db, task).await;
            let _ = ack.send(result);
        }
        tracing::info!("persistence writer queue drained, shutting down");
    }

    async fn execute_with_retry(db: &Database, task: WriteTask) -> StorageResult<()> {
        match Self::execute(db, &task).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "persistence write failed, retrying in 5s");
                tokio::time::sleep(RETRY_DELAY).await;
                match Self::execute(db, &task).await {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        tracing::error!(error = %err, "persistence write failed after retry");
                        Err(StorageError::RetryExhausted(err.to_string()))
                    },
                }
            },
        }
    }

    async fn execute(db: &Database, task: &WriteTask) -> StorageResult<()> {
        match task {
            WriteTask::InsertSession(session) => {
                let content = SessionContent::from_session(session);
                let record_id = content.record_id();
                let _created: Option<records::StoredSession> =
                    db.client().create(record_id).content(content).await?;
                Ok(())
            },
            WriteTask::EndSession { id, end_time } => {
                let record_id = RecordId::from((SESSIONS_TABLE, id.as_uuid().to_string()));
                let _updated: Option<records::StoredSession> = db
                    .client()
                    .update(record_id)
                    .merge(serde_json::json!({ "status": "ended", "end_time": end_time }))
                    .await?;
                Ok(())
            },
            WriteTask::InsertMessage(message) => {
                let content = MessageContent::from_message(message)?;
                let key = content.message_uuid.clone();
                let _created: Option<records::StoredMessage> = db
                    .client()
                    .create((MESSAGES_TABLE, key))
                    .content(content)
                    .await?;
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> classroom_core::UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    #[tokio::test]
    async fn insert_and_end_session_round_trip() {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let (writer, _handle) = PersistenceWriter::spawn(db.clone());

        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        let id = session.id();
        writer.insert_session(session).await.unwrap();
        writer.end_session(id, Utc::now()).await.unwrap();

        let stored: Option<records::StoredSession> = db
            .client()
            .select((SESSIONS_TABLE, id.as_uuid().to_string()))
            .await
            .unwrap();
        let stored = stored.expect("session row should exist");
        assert_eq!(stored.status, "ended");
    }

    #[tokio::test]
    async fn insert_message_persists_content() {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let (writer, _handle) = PersistenceWriter::spawn(db.clone());

        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        let session_id = session.id();
        writer.insert_session(session).await.unwrap();

        let message = Message {
            id: classroom_core::MessageId::new(),
            session_id,
            message_type: classroom_core::MessageType::Analytics,
            context: "general".to_string(),
            from_user: uid("alice"),
            to_user: None,
            content: serde_json::json!({"event": "page_view"}),
            timestamp: Utc::now(),
        };
        let message_id = message.id;
        writer.insert_message(message).await.unwrap();

        let stored: Option<records::StoredMessage> = db
            .client()
            .select((MESSAGES_TABLE, message_id.as_uuid().to_string()))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn shutdown_drains_queue_before_handle_completes() {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let (writer, handle) = PersistenceWriter::spawn(db.clone());
        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        writer.insert_session(session).await.unwrap();
        drop(writer);
        handle.await.unwrap();
    }
}
