//! The `/ws` upgrade handler.
//!
//! Validates the connecting identity against live state before ever
//! touching the socket, then hands the upgraded connection off to the
//! per-connection task that owns it end to end.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use classroom_core::{validation, Role, SessionId};
use classroom_registry::Membership;
use classroom_router::SenderContext;
use classroom_session::run_client_session;
use classroom_telemetry::RequestContext;

use crate::state::AppState;

/// Raw query parameters as received; validated before use.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    user_id: String,
    role: String,
    session_id: String,
}

/// `GET /ws`: validates the connecting identity, checks session membership,
/// then upgrades. Failure codes per the upgrade contract: 400 invalid
/// parameter format, 403 student not on the roster, 404 unknown or ended
/// session.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let request = RequestContext::new("ws").with_operation("upgrade");
    let _guard = request.enter();

    let user_id = match validation::valid_user_id(&query.user_id) {
        Ok(id) => id,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };
    let role = match parse_role(&query.role) {
        Some(role) => role,
        None => {
            return (StatusCode::BAD_REQUEST, format!("invalid role: {}", query.role)).into_response();
        },
    };
    let session_id = match query.session_id.parse::<uuid::Uuid>() {
        Ok(uuid) => SessionId::from(uuid),
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid session_id: {}", query.session_id),
            )
                .into_response();
        },
    };

    match state.session_cache.check_membership(session_id, &user_id, role).await {
        Membership::Allowed => {},
        Membership::Forbidden => return StatusCode::FORBIDDEN.into_response(),
        Membership::NotFound => return StatusCode::NOT_FOUND.into_response(),
    }

    let sender = SenderContext { user_id, role, session_id };
    let hub = state.hub.clone();
    let reader = std::sync::Arc::clone(&state.reader);
    ws.on_upgrade(move |socket| run_client_session(socket, sender, hub, reader))
}

fn parse_role(raw: &str) -> Option<Role> {
    match raw {
        "student" => Some(Role::Student),
        "instructor" => Some(Role::Instructor),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_role_accepts_known_values_only() {
        assert_eq!(parse_role("student"), Some(Role::Student));
        assert_eq!(parse_role("instructor"), Some(Role::Instructor));
        assert_eq!(parse_role("teacher"), None);
    }
}
