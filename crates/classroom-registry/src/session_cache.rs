//! The Session Cache: an in-memory index of active sessions.
//!
//! Loaded at startup from every persisted row with `status = active`.
//! Writers only ever come from the create/end-session paths; the cache must
//! never retain an ended session, so `end` removes it outright rather than
//! flipping a status flag.

use std::collections::HashMap;

use tokio::sync::RwLock;

use classroom_core::{Role, Session, SessionId, UserId};

/// Outcome of a membership check against a cached session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The user may connect: an instructor, or a student on the roster.
    Allowed,
    /// The session exists but the user is not on its student roster.
    Forbidden,
    /// No active session with this id is cached (never existed, or ended).
    NotFound,
}

/// In-memory index of active sessions, keyed by [`SessionId`].
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache pre-populated from rehydrated active sessions, for
    /// startup reconciliation.
    #[must_use]
    pub fn from_active_sessions(sessions: Vec<Session>) -> Self {
        let map = sessions.into_iter().map(|s| (s.id(), s)).collect();
        Self {
            sessions: RwLock::new(map),
        }
    }

    /// Inserts a newly created (already persisted) session.
    pub async fn insert(&self, session: Session) {
        self.sessions.write().await.insert(session.id(), session);
    }

    /// Removes an ended (already persisted) session, returning it if it was
    /// present.
    pub async fn remove(&self, id: SessionId) -> Option<Session> {
        self.sessions.write().await.remove(&id)
    }

    /// Returns a clone of the cached session, if active.
    pub async fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Checks whether `user_id` in `role` may join `id`.
    ///
    /// Instructors are always allowed into any active session; students are
    /// allowed only if they are on the session's roster.
    pub async fn check_membership(&self, id: SessionId, user_id: &UserId, role: Role) -> Membership {
        let guard = self.sessions.read().await;
        let Some(session) = guard.get(&id) else {
            return Membership::NotFound;
        };
        let allowed = match role {
            Role::Instructor => true,
            Role::Student => session.has_student(user_id),
        };
        if allowed {
            Membership::Allowed
        } else {
            Membership::Forbidden
        }
    }

    /// Snapshot of every active session currently cached, for the REST
    /// "list active sessions" endpoint.
    pub async fn list(&self) -> Vec<Session> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Number of active sessions currently cached.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the cache holds no active sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    #[tokio::test]
    async fn instructor_always_allowed() {
        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        let id = session.id();
        let cache = SessionCache::new();
        cache.insert(session).await;

        let result = cache.check_membership(id, &uid("instr1"), Role::Instructor).await;
        assert_eq!(result, Membership::Allowed);

        let result = cache
            .check_membership(id, &uid("some-other-instructor"), Role::Instructor)
            .await;
        assert_eq!(result, Membership::Allowed);
    }

    #[tokio::test]
    async fn student_must_be_on_roster() {
        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        let id = session.id();
        let cache = SessionCache::new();
        cache.insert(session).await;

        assert_eq!(
            cache.check_membership(id, &uid("alice"), Role::Student).await,
            Membership::Allowed
        );
        assert_eq!(
            cache.check_membership(id, &uid("bob"), Role::Student).await,
            Membership::Forbidden
        );
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let cache = SessionCache::new();
        assert_eq!(
            cache
                .check_membership(SessionId::new(), &uid("alice"), Role::Student)
                .await,
            Membership::NotFound
        );
    }

    #[tokio::test]
    async fn list_returns_every_cached_session() {
        let cache = SessionCache::new();
        cache.insert(Session::new("A".to_string(), uid("instr1"), vec![uid("a")])).await;
        cache.insert(Session::new("B".to_string(), uid("instr1"), vec![uid("b")])).await;
        assert_eq!(cache.list().await.len(), 2);
    }

    #[tokio::test]
    async fn ended_session_is_removed_not_flagged() {
        let session = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("alice")]);
        let id = session.id();
        let cache = SessionCache::new();
        cache.insert(session).await;
        cache.remove(id).await;

        assert_eq!(
            cache.check_membership(id, &uid("instr1"), Role::Instructor).await,
            Membership::NotFound
        );
        assert!(cache.is_empty().await);
    }
}
