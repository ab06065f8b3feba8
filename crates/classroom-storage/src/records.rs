//! Wire shapes stored in `SurrealDB`, and their conversions to/from the
//! domain types in `classroom-core`.
//!
//! `student_ids` and `content` are stored as encoded structured text per the
//! persisted-schema note in the external interfaces: `student_ids` as a
//! native `array<string>`, `content` as a JSON-encoded string column so the
//! schema does not need to model the opaque payload's shape.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use classroom_core::{MessageId, MessageType, Session, SessionId, SessionStatus};

use crate::error::{StorageError, StorageResult};

pub(crate) const SESSIONS_TABLE: &str = "sessions";
pub(crate) const MESSAGES_TABLE: &str = "messages";

fn session_record_id(id: SessionId) -> RecordId {
    RecordId::from((SESSIONS_TABLE, id.as_uuid().to_string()))
}

/// Content written on `CreateSession` (no record id; `SurrealDB` assigns it
/// from the key passed to `create`).
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionContent {
    pub session_uuid: String,
    pub name: String,
    pub created_by: String,
    pub student_ids: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: String,
}

/// Full row shape returned by `SELECT`/`UPDATE`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredSession {
    #[allow(dead_code)]
    pub id: RecordId,
    pub session_uuid: String,
    pub name: String,
    pub created_by: String,
    pub student_ids: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: String,
}

impl SessionContent {
    pub(crate) fn from_session(session: &Session) -> Self {
        Self {
            session_uuid: session.id().as_uuid().to_string(),
            name: session.name().to_string(),
            created_by: session.created_by().to_string(),
            student_ids: session
                .student_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
            start_time: session.start_time(),
            end_time: session.end_time(),
            status: match session.status() {
                SessionStatus::Active => "active".to_string(),
                SessionStatus::Ended => "ended".to_string(),
            },
        }
    }

    pub(crate) fn record_id(&self) -> RecordId {
        RecordId::from((SESSIONS_TABLE, self.session_uuid.clone()))
    }
}

impl StoredSession {
    /// Converts a stored row back into a [`Session`] domain object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if a stored field no longer
    /// parses as the type it was written as (should not happen against a
    /// schema this crate owns, but persisted data outlives code changes).
    pub fn into_session(self) -> StorageResult<Session> {
        let uuid = uuid::Uuid::parse_str(&self.session_uuid)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let created_by = classroom_core::validation::valid_user_id(&self.created_by)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let student_ids = self
            .student_ids
            .iter()
            .map(|s| classroom_core::validation::valid_user_id(s))
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let status = match self.status.as_str() {
            "active" => SessionStatus::Active,
            "ended" => SessionStatus::Ended,
            other => {
                return Err(StorageError::Serialization(format!(
                    "unknown session status {other:?}"
                )));
            },
        };
        Ok(Session::from_parts(
            SessionId::from(uuid),
            self.name,
            created_by,
            student_ids,
            self.start_time,
            self.end_time,
            status,
        ))
    }
}

/// Content written on message insert.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessageContent {
    pub message_uuid: String,
    pub session_id: RecordId,
    pub message_type: String,
    pub context: String,
    pub from_user: String,
    pub to_user: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Full row shape returned by `SELECT`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredMessage {
    #[allow(dead_code)]
    pub id: RecordId,
    pub message_uuid: String,
    #[allow(dead_code)]
    pub session_id: RecordId,
    pub message_type: String,
    pub context: String,
    pub from_user: String,
    pub to_user: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageContent {
    pub(crate) fn from_message(message: &classroom_core::Message) -> StorageResult<Self> {
        Ok(Self {
            message_uuid: message.id.as_uuid().to_string(),
            session_id: session_record_id(message.session_id),
            message_type: message.message_type.as_str().to_string(),
            context: message.context.clone(),
            from_user: message.from_user.to_string(),
            to_user: message.to_user.as_ref().map(ToString::to_string),
            content: serde_json::to_string(&message.content)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            timestamp: message.timestamp,
        })
    }
}

impl StoredMessage {
    /// Converts a stored row back into a [`classroom_core::Message`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the row's fields do not
    /// parse as their expected types.
    pub fn into_message(self, session_id: SessionId) -> StorageResult<classroom_core::Message> {
        let id = uuid::Uuid::parse_str(&self.message_uuid)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let message_type = parse_message_type(&self.message_type)?;
        let from_user = classroom_core::validation::valid_user_id(&self.from_user)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let to_user = self
            .to_user
            .as_deref()
            .map(classroom_core::validation::valid_user_id)
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let content = serde_json::from_str(&self.content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(classroom_core::Message {
            id: MessageId::from(id),
            session_id,
            message_type,
            context: self.context,
            from_user,
            to_user,
            content,
            timestamp: self.timestamp,
        })
    }
}

fn parse_message_type(raw: &str) -> StorageResult<MessageType> {
    classroom_core::validation::valid_message_type(raw)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}
