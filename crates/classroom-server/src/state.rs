//! Shared application state handed to every axum handler.

use std::sync::Arc;
use std::time::Instant;

use classroom_hub::HubHandle;
use classroom_registry::{ConnectionRegistry, RateLimiter, SessionCache};
use classroom_storage::{PersistenceWriter, StorageReader};

/// Everything a REST handler or the `/ws` upgrade needs, cloned cheaply per
/// request (every field is an `Arc`, a handle, or `Copy`).
#[derive(Clone)]
pub struct AppState {
    /// Submits events to the running Hub Coordinator.
    pub hub: HubHandle,
    /// Live connection state, read directly for occupancy counts.
    pub registry: Arc<ConnectionRegistry>,
    /// In-memory index of active sessions.
    pub session_cache: Arc<SessionCache>,
    /// Durable persistence for session/message writes.
    pub writer: PersistenceWriter,
    /// Read-only queries against the embedded store.
    pub reader: Arc<StorageReader>,
    /// Per-user message admission control.
    pub rate_limiter: Arc<RateLimiter>,
    /// Process start time, for the `/health` uptime field.
    pub started_at: Instant,
}
