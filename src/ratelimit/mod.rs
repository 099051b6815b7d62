use governor::{ DefaultDirectRateLimiter, Quota, RateLimiter };
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::{ Duration, Instant };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    pub reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed {
        remaining: u32,
    },
    Denied {
        retry_after: Duration,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

const MAX_WINDOW: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Fixed-window request counter keyed by client address.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    records: HashMap<String, RateRecord>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            records: HashMap::new(),
        }
    }

    pub fn check(&mut self, client_id: &str) -> RateDecision {
        self.check_at(client_id, Instant::now())
    }

    pub fn check_at(&mut self, client_id: &str, now: Instant) -> RateDecision {
        if let Some(rec) = self.records.get_mut(client_id) {
            if now <= rec.reset_at {
                if rec.count >= self.max_requests {
                    return RateDecision::Denied {
                        retry_after: rec.reset_at - now,
                    };
                }
                rec.count += 1;
                return RateDecision::Allowed {
                    remaining: self.max_requests - rec.count,
                };
            }
        }

        // Windows too large to represent saturate at the longest supported span.
        let reset_at = now
            .checked_add(self.window)
            .or_else(|| now.checked_add(MAX_WINDOW))
            .unwrap_or(now);
        self.records.insert(client_id.to_string(), RateRecord {
            count: 1,
            reset_at,
        });
        RateDecision::Allowed {
            remaining: self.max_requests.saturating_sub(1),
        }
    }

    /// Drops every record whose window has already closed. Returns how many were removed.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let before = self.records.len();
        self.records.retain(|_, rec| now <= rec.reset_at);
        before - self.records.len()
    }

    pub fn record(&self, client_id: &str) -> Option<RateRecord> {
        self.records.get(client_id).copied()
    }

    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }
}

pub fn global_limiter(per_second: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(per_second))
}
