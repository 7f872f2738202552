//! Sliding-window failure lockout for code verification.
//!
//! An additive policy layer wrapping verification: repeated failed code
//! submissions within the window lock the account out of further attempts
//! until old failures age out. The core verification contract is unchanged.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_MAX_FAILURES: u32 = 5;
pub const DEFAULT_WINDOW_SECONDS: u64 = 15 * 60;

pub struct LockoutTracker {
    max_failures: u32,
    window: Duration,
    failures: Mutex<HashMap<Uuid, VecDeque<Instant>>>,
}

impl LockoutTracker {
    #[must_use]
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            max_failures: max_failures.max(1),
            window,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `user_id` has reached the failure limit within the window.
    pub fn is_locked(&self, user_id: Uuid) -> bool {
        let Ok(mut failures) = self.failures.lock() else {
            // A poisoned lock fails open; verification still requires a valid code.
            return false;
        };
        let Some(entries) = failures.get_mut(&user_id) else {
            return false;
        };
        let cutoff = Instant::now();
        while entries
            .front()
            .is_some_and(|at| cutoff.duration_since(*at) >= self.window)
        {
            entries.pop_front();
        }
        if entries.is_empty() {
            failures.remove(&user_id);
            return false;
        }
        entries.len() >= self.max_failures as usize
    }

    /// Record one failed verification attempt.
    pub fn record_failure(&self, user_id: Uuid) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.entry(user_id).or_default().push_back(Instant::now());
        }
    }

    /// Clear recorded failures after a successful verification.
    pub fn clear(&self, user_id: Uuid) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(&user_id);
        }
    }
}
