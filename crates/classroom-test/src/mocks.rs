//! Fakes for testing the routing and connection layers without a real
//! network socket or a persistent database.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use classroom_core::OutboundEnvelope;

/// Captures every [`OutboundEnvelope`] sent to it, for assertions in router
/// and hub tests. Uses `std::sync::Mutex` rather than an async lock: the
/// capture itself never awaits, so there is no reason to pay for one.
#[derive(Debug, Clone, Default)]
pub struct MockOutbound {
    sent: Arc<Mutex<Vec<OutboundEnvelope>>>,
}

impl MockOutbound {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sent envelope.
    pub fn record(&self, envelope: OutboundEnvelope) {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(envelope);
        }
    }

    /// Returns every envelope recorded so far, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundEnvelope> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Returns the most recently recorded envelope, if any.
    #[must_use]
    pub fn last(&self) -> Option<OutboundEnvelope> {
        self.sent.lock().ok().and_then(|g| g.last().cloned())
    }

    /// Whether any recorded envelope has the given `type` field.
    #[must_use]
    pub fn contains_message_type(&self, message_type: &str) -> bool {
        self.sent
            .lock()
            .map(|g| g.iter().any(|e| e.message_type == message_type))
            .unwrap_or(false)
    }

    /// Clears every recorded envelope.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.sent.lock() {
            guard.clear();
        }
    }
}

/// Creates a bounded outbound channel sized like a real Client Session's
/// delivery queue, for tests that exercise the Connection Registry or Hub
/// Coordinator without a live WebSocket.
#[must_use]
pub fn fake_outbound_channel(
    buffer: usize,
) -> (mpsc::Sender<OutboundEnvelope>, mpsc::Receiver<OutboundEnvelope>) {
    mpsc::channel(buffer)
}

/// Opens a fresh in-memory `SurrealDB` instance for a single test. Each call
/// gets an isolated database: the in-memory engine has no shared state
/// across connections.
///
/// # Panics
///
/// Panics if the in-memory engine fails to initialize, which would indicate
/// a broken `SurrealDB` build rather than a test-writer error.
pub async fn test_database() -> Arc<classroom_storage::Database> {
    Arc::new(
        classroom_storage::Database::connect_memory()
            .await
            .expect("in-memory database should always connect"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::{MessageId, SessionId};

    fn envelope(message_type: &str) -> OutboundEnvelope {
        OutboundEnvelope {
            id: MessageId::new(),
            message_type: message_type.to_string(),
            context: "general".to_string(),
            from_user: "instructor1".to_string(),
            to_user: None,
            session_id: SessionId::new(),
            content: serde_json::json!({}),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn mock_outbound_records_in_order() {
        let mock = MockOutbound::new();
        mock.record(envelope("analytics"));
        mock.record(envelope("instructor_broadcast"));
        assert_eq!(mock.sent().len(), 2);
        assert!(mock.contains_message_type("instructor_broadcast"));
        assert!(!mock.contains_message_type("request"));
    }

    #[tokio::test]
    async fn test_database_applies_schema() {
        let db = test_database().await;
        let reader = classroom_storage::StorageReader::new(db);
        let sessions = reader.list_active_sessions().await.unwrap();
        assert!(sessions.is_empty());
    }
}
