//! Per-endpoint token-bucket rate limiting for ingest handlers.
//!
//! Mirrors the float token-bucket algorithm used for request-level
//! rate limiting elsewhere in this codebase, keyed by endpoint name
//! instead of client id since the capture pipeline has no client
//! concept of its own (spec §4.3: "a token-bucket on each ingest
//! endpoint").

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(max_requests: u32, window: Duration) -> Self {
        let max_tokens = f64::from(max_requests);
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate: max_tokens / window.as_secs_f64(),
            last_refill: Instant::now(),
        }
    }

    fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        if elapsed >= Duration::from_millis(10) {
            self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.max_tokens);
            self.last_refill = now;
        }
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limiter shared across all ingest endpoints, one bucket and one
/// dropped-count counter per endpoint name.
pub struct IngestRateLimiter {
    max_requests: u32,
    window: Duration,
    buckets: Mutex<HashMap<&'static str, TokenBucket>>,
    dropped: HashMap<&'static str, AtomicU64>,
}

/// Endpoints the capture pipeline rate-limits independently.
pub const ENDPOINTS: &[&str] = &["logs", "network-bodies", "websocket-events", "actions", "performance"];

impl IngestRateLimiter {
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            buckets: Mutex::new(HashMap::new()),
            dropped: ENDPOINTS.iter().map(|&e| (e, AtomicU64::new(0))).collect(),
        }
    }

    /// Returns true if the request is allowed; false if it should be
    /// rejected with 429. Bumps the endpoint's dropped counter on
    /// rejection so it stays observable (spec §4.3).
    pub fn check(&self, endpoint: &'static str) -> bool {
        let allowed = {
            let mut buckets = self.buckets.lock();
            let bucket = buckets
                .entry(endpoint)
                .or_insert_with(|| TokenBucket::new(self.max_requests, self.window));
            bucket.try_acquire()
        };
        if !allowed {
            if let Some(counter) = self.dropped.get(endpoint) {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
        allowed
    }

    /// Total requests dropped at this endpoint since startup.
    #[must_use]
    pub fn dropped_count(&self, endpoint: &str) -> u64 {
        self.dropped.get(endpoint).map_or(0, |c| c.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_bucket_rejects_and_counts_drops() {
        let limiter = IngestRateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check("logs"));
        assert!(limiter.check("logs"));
        assert!(!limiter.check("logs"));
        assert_eq!(limiter.dropped_count("logs"), 1);
        // A different endpoint has its own bucket.
        assert!(limiter.check("actions"));
    }
}
