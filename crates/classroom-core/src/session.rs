//! The [`Session`] entity: a named, immutable classroom context.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SessionId, UserId};

/// Lifecycle status of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The session accepts connections and routed messages.
    Active,
    /// The session has ended; it never returns to active.
    Ended,
}

/// A named classroom session.
///
/// `name`, `created_by`, and `student_ids` are immutable after construction;
/// only `status`/`end_time` change, and exactly once (active -> ended).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    name: String,
    created_by: UserId,
    student_ids: BTreeSet<UserId>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    status: SessionStatus,
}

impl Session {
    /// Constructs a new active session with a fresh id and server-assigned
    /// start time. `student_ids` is de-duplicated by the caller before this
    /// is called (the [`crate::ids::UserId`] -> `BTreeSet` conversion also
    /// de-duplicates defensively).
    #[must_use]
    pub fn new(name: String, created_by: UserId, student_ids: Vec<UserId>) -> Self {
        Self {
            id: SessionId::new(),
            name,
            created_by,
            student_ids: student_ids.into_iter().collect(),
            start_time: Utc::now(),
            end_time: None,
            status: SessionStatus::Active,
        }
    }

    /// Reconstructs a session from persisted fields, for startup rehydration
    /// and storage round-trips. Does not re-validate; the persisted row is
    /// trusted.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: SessionId,
        name: String,
        created_by: UserId,
        student_ids: BTreeSet<UserId>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        status: SessionStatus,
    ) -> Self {
        Self {
            id,
            name,
            created_by,
            student_ids,
            start_time,
            end_time,
            status,
        }
    }

    /// The session's id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The session's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instructor who created the session.
    #[must_use]
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// The session's student roster.
    #[must_use]
    pub fn student_ids(&self) -> &BTreeSet<UserId> {
        &self.student_ids
    }

    /// Whether `user_id` is a member of this session's student roster.
    #[must_use]
    pub fn has_student(&self, user_id: &UserId) -> bool {
        self.student_ids.contains(user_id)
    }

    /// The server-assigned start time.
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// The end time, present only once the session has ended.
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// The current lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether the session is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Transitions the session to ended, stamping `end_time`.
    ///
    /// Idempotent in effect but not in return value: returns `false` (a
    /// no-op) if the session was already ended, so callers can surface
    /// "already ended" distinctly from a fresh transition.
    pub fn end(&mut self) -> bool {
        if self.status == SessionStatus::Ended {
            return false;
        }
        self.status = SessionStatus::Ended;
        self.end_time = Some(Utc::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        crate::validation::valid_user_id(s).unwrap()
    }

    #[test]
    fn new_session_is_active_with_no_end_time() {
        let s = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("a")]);
        assert!(s.is_active());
        assert!(s.end_time().is_none());
    }

    #[test]
    fn duplicate_student_ids_collapse() {
        let s = Session::new(
            "Algebra".to_string(),
            uid("instr1"),
            vec![uid("a"), uid("a"), uid("b")],
        );
        assert_eq!(s.student_ids().len(), 2);
    }

    #[test]
    fn end_is_idempotent_in_effect() {
        let mut s = Session::new("Algebra".to_string(), uid("instr1"), vec![uid("a")]);
        assert!(s.end());
        assert!(s.end_time().is_some());
        assert!(!s.end(), "second end() call must be a no-op");
        assert_eq!(s.status(), SessionStatus::Ended);
    }
}
