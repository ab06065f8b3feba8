//! Session lifecycle REST handlers: create, end, get, list active.
//!
//! `created_by` never arrives as a request body field — these REST shapes
//! are fixed for wire compatibility and carry no such field. The creating
//! instructor's identity is instead trusted from the `x-user-id` header, the
//! same trust boundary the `/ws` upgrade applies to its `user_id` query
//! parameter: upstream authentication is out of scope, the core trusts the
//! declared identity.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use classroom_core::{validation, Session, SessionId, SessionStatus};
use serde::{Deserialize, Serialize};

use crate::rest::error::ApiError;
use crate::state::AppState;

const IDENTITY_HEADER: &str = "x-user-id";

fn trusted_user_id(headers: &HeaderMap) -> Result<classroom_core::UserId, ApiError> {
    let raw = headers
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(validation::valid_user_id(raw)?)
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// The session's display name.
    pub name: String,
    /// The student roster, by user id.
    #[serde(default)]
    pub student_ids: Vec<String>,
}

/// Response shared by create/end/get handlers.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    session_id: SessionId,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ended_at: Option<DateTime<Utc>>,
}

impl SessionResponse {
    fn from_session(session: &Session) -> Self {
        match session.status() {
            SessionStatus::Active => Self {
                session_id: session.id(),
                status: "active",
                created_at: Some(session.start_time()),
                ended_at: None,
            },
            SessionStatus::Ended => Self {
                session_id: session.id(),
                status: "ended",
                created_at: None,
                ended_at: session.end_time(),
            },
        }
    }
}

/// `POST /api/sessions`: validates and persists a new active session before
/// making it visible in the cache, so a crash mid-create never leaves a
/// joinable session with no durable record.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    validation::valid_session_name(&body.name)?;
    let created_by = trusted_user_id(&headers)?;
    let student_ids = body
        .student_ids
        .iter()
        .map(|s| validation::valid_user_id(s))
        .collect::<Result<Vec<_>, _>>()?;
    validation::valid_student_ids(&student_ids)?;

    let session = Session::new(body.name, created_by, student_ids);
    state.writer.insert_session(session.clone()).await?;
    state.session_cache.insert(session.clone()).await;

    Ok((StatusCode::CREATED, Json(SessionResponse::from_session(&session))))
}

/// `DELETE /api/sessions/{id}`: ends an active session, persisting the
/// transition before removing it from the cache so a concurrent join never
/// sees a session that is "ended" in the cache but still active on disk.
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Some(mut session) = state.session_cache.get(id).await else {
        // Not in the cache: either it never existed, or it already ended.
        // The cache invariant (every active session is cached) means a
        // durable row found here can only be an already-ended one.
        return match state.reader.get_session(id).await {
            Ok(_) => Err(ApiError::SessionAlreadyEnded),
            Err(classroom_storage::StorageError::NotFound(_)) => Err(ApiError::SessionNotFound),
            Err(err) => Err(err.into()),
        };
    };
    session.end();
    let end_time = session.end_time().expect("end() just set it");
    state.writer.end_session(id, end_time).await?;
    state.session_cache.remove(id).await;

    Ok(Json(SessionResponse::from_session(&session)))
}

/// `GET /api/sessions/{id}`: active sessions come from the cache, ended ones
/// fall back to the durable record.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    if let Some(session) = state.session_cache.get(id).await {
        return Ok(Json(SessionResponse::from_session(&session)));
    }
    match state.reader.get_session(id).await {
        Ok(session) => Ok(Json(SessionResponse::from_session(&session))),
        Err(classroom_storage::StorageError::NotFound(_)) => Err(ApiError::SessionNotFound),
        Err(err) => Err(err.into()),
    }
}

/// One entry in `GET /api/sessions`'s `sessions` array.
#[derive(Debug, Serialize)]
pub struct ActiveSessionEntry {
    session_id: SessionId,
    name: String,
    created_by: String,
    student_count: usize,
    connected_clients: usize,
    created_at: DateTime<Utc>,
}

/// Response of `GET /api/sessions`.
#[derive(Debug, Serialize)]
pub struct ListActiveResponse {
    sessions: Vec<ActiveSessionEntry>,
    total_count: usize,
}

/// `GET /api/sessions`: every active session plus its currently connected
/// client count, drawn from the live Connection Registry rather than the
/// persisted roster size.
pub async fn list_active_sessions(
    State(state): State<AppState>,
) -> Result<Json<ListActiveResponse>, ApiError> {
    let mut sessions = Vec::new();
    for session in state.session_cache.list().await {
        let instructors = state.registry.instructors_of(session.id()).await.len();
        let students = state.registry.students_of(session.id()).await.len();
        sessions.push(ActiveSessionEntry {
            session_id: session.id(),
            name: session.name().to_string(),
            created_by: session.created_by().to_string(),
            student_count: session.student_ids().len(),
            connected_clients: instructors + students,
            created_at: session.start_time(),
        });
    }
    let total_count = sessions.len();
    Ok(Json(ListActiveResponse { sessions, total_count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_response_reports_active_fields() {
        let session = Session::new(
            "Algebra".to_string(),
            classroom_core::validation::valid_user_id("instr1").unwrap(),
            vec![classroom_core::validation::valid_user_id("alice").unwrap()],
        );
        let resp = SessionResponse::from_session(&session);
        assert_eq!(resp.status, "active");
        assert!(resp.created_at.is_some());
        assert!(resp.ended_at.is_none());
    }

    #[test]
    fn session_response_reports_ended_fields() {
        let mut session = Session::new(
            "Algebra".to_string(),
            classroom_core::validation::valid_user_id("instr1").unwrap(),
            vec![classroom_core::validation::valid_user_id("alice").unwrap()],
        );
        session.end();
        let resp = SessionResponse::from_session(&session);
        assert_eq!(resp.status, "ended");
        assert!(resp.ended_at.is_some());
    }
}
