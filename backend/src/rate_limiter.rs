use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use time::{OffsetDateTime, Duration};
use tracing::{warn, error, debug};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: OffsetDateTime,
}

#[derive(Debug)]
struct RateWindow {
    count: u32,
    reset_at: OffsetDateTime,
}

/// Fixed-window counter: the window starts at the first attempt and is
/// replaced wholesale once it has passed, so bursts straddling a boundary
/// are accepted.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, RateWindow>>,
    max_attempts: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MINUTES)
    }
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_attempts,
            window: Duration::minutes(window_minutes),
        }
    }

    fn windows(&self) -> MutexGuard<'_, HashMap<String, RateWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            error!("Rate limit lock poisoned; continuing with existing counters");
            poisoned.into_inner()
        })
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, self.max_attempts, self.window, OffsetDateTime::now_utc())
    }

    pub fn check_with(&self, key: &str, max_attempts: u32, window_ms: i64) -> RateLimitDecision {
        self.check_at(key, max_attempts, Duration::milliseconds(window_ms), OffsetDateTime::now_utc())
    }

    pub fn check_at(&self, key: &str, max_attempts: u32, window: Duration, now: OffsetDateTime) -> RateLimitDecision {
        let decision = {
            let mut windows = self.windows();
            match windows.get_mut(key) {
                Some(w) if now <= w.reset_at => {
                    if w.count >= max_attempts {
                        RateLimitDecision { allowed: false, remaining: 0, reset_at: w.reset_at }
                    } else {
                        w.count += 1;
                        RateLimitDecision {
                            allowed: true,
                            remaining: max_attempts - w.count,
                            reset_at: w.reset_at,
                        }
                    }
                }
                _ => {
                    let reset_at = now + window;
                    windows.insert(key.to_string(), RateWindow { count: 1, reset_at });
                    RateLimitDecision {
                        allowed: true,
                        remaining: max_attempts.saturating_sub(1),
                        reset_at,
                    }
                }
            }
        };

        if decision.allowed {
            debug!("Rate limit for {}: {} remaining", key, decision.remaining);
        } else {
            warn!("Rate limit triggered for key {} until {}", key, decision.reset_at);
        }
        decision
    }

    /// Drops windows that have already passed; returns how many were removed.
    pub fn prune_expired(&self, now: OffsetDateTime) -> usize {
        let mut windows = self.windows();
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_at);
        before - windows.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows().len()
    }
}
