//! Per-user sliding-window rate limiting.
//!
//! Each user gets an independent `(window_start, count)` pair. A `DashMap`
//! gives per-entry locking, so concurrent attempts from different users
//! never contend with each other, and each operation stays O(1).

use std::time::{Duration, Instant};

use dashmap::DashMap;

use classroom_core::UserId;

const WINDOW: Duration = Duration::from_secs(60);
const CAP: u32 = 100;
const SWEEP_IDLE_AFTER: Duration = Duration::from_secs(5 * 60);

struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Per-user fixed-window rate limiter: 100 messages per rolling 60-second
/// window per user, reset on first attempt after the window elapses.
#[derive(Default)]
pub struct RateLimiter {
    state: DashMap<UserId, WindowState>,
}

impl RateLimiter {
    /// An empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempt for `user_id` and reports whether it is admitted.
    ///
    /// A user's very first attempt always admits. Attempts within the same
    /// 60-second window beyond the 100th are denied; a new window resets
    /// the count to 1 and admits.
    #[must_use]
    pub fn check(&self, user_id: &UserId) -> bool {
        let now = Instant::now();
        let mut entry = self.state.entry(user_id.clone()).or_insert_with(|| WindowState {
            window_start: now,
            count: 0,
        });
        if now.duration_since(entry.window_start) >= WINDOW {
            entry.window_start = now;
            entry.count = 1;
            return true;
        }
        if entry.count >= CAP {
            return false;
        }
        entry.count = entry.count.saturating_add(1);
        true
    }

    /// Removes every user's state idle for more than 5 minutes. Intended to
    /// be driven by a periodic background task so the map does not grow
    /// unbounded with one-shot or departed users.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.state
            .retain(|_, state| now.duration_since(state.window_start) <= SWEEP_IDLE_AFTER);
    }

    /// Number of users with tracked state, for diagnostics.
    #[must_use]
    pub fn tracked_users(&self) -> usize {
        self.state.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        classroom_core::validation::valid_user_id(s).unwrap()
    }

    #[test]
    fn first_message_always_admits() {
        let limiter = RateLimiter::new();
        assert!(limiter.check(&uid("alice")));
    }

    #[test]
    fn cap_denies_the_101st_message_in_window() {
        let limiter = RateLimiter::new();
        let alice = uid("alice");
        for _ in 0..100 {
            assert!(limiter.check(&alice));
        }
        assert!(!limiter.check(&alice));
    }

    #[test]
    fn users_are_tracked_independently() {
        let limiter = RateLimiter::new();
        let alice = uid("alice");
        let bob = uid("bob");
        for _ in 0..100 {
            assert!(limiter.check(&alice));
        }
        assert!(!limiter.check(&alice));
        assert!(limiter.check(&bob));
    }

    #[test]
    fn sweep_removes_nothing_when_all_fresh() {
        let limiter = RateLimiter::new();
        limiter.check(&uid("alice"));
        limiter.sweep();
        assert_eq!(limiter.tracked_users(), 1);
    }
}
