//! Rate limiting primitives for auth and step-up flows.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_LIMIT_PER_WINDOW: u32 = 30;
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    Register,
    Login,
    StepUpRequest,
    StepUpVerify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_account(&self, user_id: Uuid, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_account(&self, _user_id: Uuid, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// In-memory sliding-window limiter keyed by (scope, action).
///
/// Each check records an attempt; attempts older than the window fall out.
/// Requests without an attributable IP are allowed through, since limiting
/// an empty key would throttle all anonymous traffic collectively.
pub struct SlidingWindowRateLimiter {
    limit: u32,
    window: Duration,
    attempts: Mutex<HashMap<(String, RateLimitAction), VecDeque<Instant>>>,
}

impl SlidingWindowRateLimiter {
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn check_scope(&self, scope: String, action: RateLimitAction) -> RateLimitDecision {
        let Ok(mut attempts) = self.attempts.lock() else {
            // A poisoned lock fails open rather than refusing all traffic.
            return RateLimitDecision::Allowed;
        };
        let entries = attempts.entry((scope, action)).or_default();
        let now = Instant::now();
        while entries
            .front()
            .is_some_and(|at| now.duration_since(*at) >= self.window)
        {
            entries.pop_front();
        }
        if entries.len() >= self.limit as usize {
            return RateLimitDecision::Limited;
        }
        entries.push_back(now);
        RateLimitDecision::Allowed
    }
}

impl RateLimiter for SlidingWindowRateLimiter {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision {
        match ip {
            Some(ip) => self.check_scope(format!("ip:{ip}"), action),
            None => RateLimitDecision::Allowed,
        }
    }

    fn check_account(&self, user_id: Uuid, action: RateLimitAction) -> RateLimitDecision {
        self.check_scope(format!("account:{user_id}"), action)
    }
}
