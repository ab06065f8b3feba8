//! The Connection Registry: three indexes over live Client Sessions.
//!
//! A handle type wraps shared mutable state, looked up from a manager's
//! maps, generalized here to three simultaneous indexes — by user, and by
//! session split into instructors and students — all mutated together under
//! one lock so no reader ever observes them out of sync with each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::RwLock;
use uuid::Uuid;

use classroom_core::{OutboundEnvelope, Role, SessionId, UserId};

use crate::error::{RegistryError, RegistryResult};

/// A handle to one live Client Session's outbound delivery queue.
///
/// Cheaply cloneable; every clone enqueues onto the same underlying channel.
/// Equality and the registry's race-safe unregister are both based on
/// `connection_id`, not on `user_id`: two connections for the same user
/// (one replacing the other) are never confused for each other.
#[derive(Clone)]
pub struct ConnectionHandle {
    connection_id: Uuid,
    user_id: UserId,
    role: Role,
    session_id: SessionId,
    outbound: mpsc::Sender<OutboundEnvelope>,
}

impl ConnectionHandle {
    /// Builds a handle wrapping a Client Session's outbound sender.
    #[must_use]
    pub fn new(
        user_id: UserId,
        role: Role,
        session_id: SessionId,
        outbound: mpsc::Sender<OutboundEnvelope>,
    ) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            user_id,
            role,
            session_id,
            outbound,
        }
    }

    /// The user this connection belongs to.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The connected role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The session this connection is bound to.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Enqueues an envelope without blocking. A full queue returns the
    /// envelope back to the caller rather than awaiting space — per the
    /// routing contract, one slow recipient must never stall delivery to
    /// the others.
    ///
    /// # Errors
    ///
    /// Returns the envelope back to the caller if the queue is full or the
    /// Client Session's write task has already shut down.
    pub fn try_send(
        &self,
        envelope: OutboundEnvelope,
    ) -> Result<(), mpsc::error::TrySendError<OutboundEnvelope>> {
        self.outbound.try_send(envelope)
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.connection_id == other.connection_id
    }
}

impl Eq for ConnectionHandle {}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("connection_id", &self.connection_id)
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// A snapshot of registry occupancy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStats {
    /// Total live connections across every session.
    pub total_connections: usize,
    /// Number of distinct sessions with at least one live connection.
    pub active_sessions: usize,
}

#[derive(Default)]
struct RegistryInner {
    by_user_id: HashMap<UserId, ConnectionHandle>,
    instructors_by_session: HashMap<SessionId, HashMap<UserId, ConnectionHandle>>,
    students_by_session: HashMap<SessionId, HashMap<UserId, ConnectionHandle>>,
}

/// The Connection Registry, shared behind an `Arc` by the Hub Coordinator
/// and everything that needs to compute recipients.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection. Fails if `user_id` already has one
    /// registered — the caller (the Hub loop) must unregister the old
    /// connection first, which is exactly the eviction the Hub performs on
    /// reconnect collision.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if a connection for this
    /// user is already present.
    pub async fn register(&self, handle: ConnectionHandle) -> RegistryResult<()> {
        let mut inner = self.inner.write().await;
        if inner.by_user_id.contains_key(&handle.user_id) {
            return Err(RegistryError::AlreadyRegistered {
                user_id: handle.user_id.clone(),
            });
        }
        let role_index = match handle.role {
            Role::Instructor => &mut inner.instructors_by_session,
            Role::Student => &mut inner.students_by_session,
        };
        role_index
            .entry(handle.session_id)
            .or_default()
            .insert(handle.user_id.clone(), handle.clone());
        inner.by_user_id.insert(handle.user_id.clone(), handle);
        Ok(())
    }

    /// Unregisters a connection, but only if it is still the exact instance
    /// registered — race-safe against a newer connection for the same user
    /// having already replaced it.
    pub async fn unregister(&self, handle: &ConnectionHandle) {
        let mut inner = self.inner.write().await;
        if inner.by_user_id.get(&handle.user_id) == Some(handle) {
            inner.by_user_id.remove(&handle.user_id);
        }
        let role_index = match handle.role {
            Role::Instructor => &mut inner.instructors_by_session,
            Role::Student => &mut inner.students_by_session,
        };
        if let Some(session_map) = role_index.get_mut(&handle.session_id) {
            if session_map.get(&handle.user_id) == Some(handle) {
                session_map.remove(&handle.user_id);
            }
            if session_map.is_empty() {
                role_index.remove(&handle.session_id);
            }
        }
    }

    /// Looks up the live connection for a user, if any.
    pub async fn get(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.inner.read().await.by_user_id.get(user_id).cloned()
    }

    /// All instructors currently connected to `session_id`.
    pub async fn instructors_of(&self, session_id: SessionId) -> Vec<ConnectionHandle> {
        self.inner
            .read()
            .await
            .instructors_by_session
            .get(&session_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All students currently connected to `session_id`.
    pub async fn students_of(&self, session_id: SessionId) -> Vec<ConnectionHandle> {
        self.inner
            .read()
            .await
            .students_by_session
            .get(&session_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// A single student of `session_id` by user id, if currently connected.
    pub async fn student_of(&self, session_id: SessionId, user_id: &UserId) -> Option<ConnectionHandle> {
        self.inner
            .read()
            .await
            .students_by_session
            .get(&session_id)
            .and_then(|m| m.get(user_id))
            .cloned()
    }

    /// A snapshot of registry occupancy.
    pub async fn stats(&self) -> RegistryStats {
        let inner = self.inner.read().await;
        let sessions: std::collections::HashSet<&SessionId> = inner
            .instructors_by_session
            .keys()
            .chain(inner.students_by_session.keys())
            .collect();
        RegistryStats {
            total_connections: inner.by_user_id.len(),
            active_sessions: sessions.len(),
        }
    }
}

/// Shared handle to a [`ConnectionRegistry`].
pub type SharedRegistry = Arc<ConnectionRegistry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    fn handle(user: &str, role: Role, session_id: SessionId) -> (ConnectionHandle, mpsc::Receiver<OutboundEnvelope>) {
        let (tx, rx) = mpsc::channel(8);
        (ConnectionHandle::new(uid(user), role, session_id, tx), rx)
    }

    #[tokio::test]
    async fn register_then_get_round_trips() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        let (h, _rx) = handle("alice", Role::Student, session_id);
        registry.register(h.clone()).await.unwrap();

        let found = registry.get(&uid("alice")).await.unwrap();
        assert_eq!(found, h);
    }

    #[tokio::test]
    async fn duplicate_register_for_same_user_fails() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        let (h1, _rx1) = handle("alice", Role::Student, session_id);
        let (h2, _rx2) = handle("alice", Role::Student, session_id);
        registry.register(h1).await.unwrap();
        let err = registry.register(h2).await.unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
    }

    #[tokio::test]
    async fn unregister_is_race_safe_against_replacement() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        let (h1, _rx1) = handle("alice", Role::Student, session_id);
        registry.register(h1.clone()).await.unwrap();
        registry.unregister(&h1).await;

        let (h2, _rx2) = handle("alice", Role::Student, session_id);
        registry.register(h2.clone()).await.unwrap();

        // Stale unregister for the evicted h1 must not remove h2.
        registry.unregister(&h1).await;
        assert_eq!(registry.get(&uid("alice")).await, Some(h2));
    }

    #[tokio::test]
    async fn instructors_and_students_are_indexed_separately() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        let (instr, _rx1) = handle("instr1", Role::Instructor, session_id);
        let (student, _rx2) = handle("alice", Role::Student, session_id);
        registry.register(instr).await.unwrap();
        registry.register(student).await.unwrap();

        assert_eq!(registry.instructors_of(session_id).await.len(), 1);
        assert_eq!(registry.students_of(session_id).await.len(), 1);

        let stats = registry.stats().await;
        assert_eq!(stats.total_connections, 2);
        assert_eq!(stats.active_sessions, 1);
    }
}
