//! `AlertBuffer`: pending alerts (cap 50, FIFO evict) plus CI results
//! (cap 10), drained atomically (spec §4.6).

use crate::alert::Alert;
use crate::ci::CiResult;
use crate::drain;
use parking_lot::Mutex;
use std::collections::VecDeque;

pub const MAX_PENDING_ALERTS: usize = 50;
pub const MAX_CI_RESULTS: usize = 10;

pub struct AlertBuffer {
    pending: Mutex<VecDeque<Alert>>,
    ci_results: Mutex<VecDeque<CiResult>>,
}

impl Default for AlertBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self { pending: Mutex::new(VecDeque::new()), ci_results: Mutex::new(VecDeque::new()) }
    }

    pub fn add_alert(&self, alert: Alert) {
        let mut pending = self.pending.lock();
        if pending.len() >= MAX_PENDING_ALERTS {
            pending.pop_front();
        }
        pending.push_back(alert);
    }

    /// Atomically move all pending alerts out, then run the drain
    /// pipeline (dedup -> correlate -> sort) on the removed batch.
    #[must_use]
    pub fn drain_alerts(&self) -> Vec<Alert> {
        let taken: Vec<Alert> = {
            let mut pending = self.pending.lock();
            pending.drain(..).collect()
        };
        drain::drain(taken)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Idempotent-per-(commit, status) insert/update for CI results,
    /// evicting the oldest past the cap (spec §4.6 CI webhook).
    pub fn upsert_ci_result(&self, result: CiResult) -> bool {
        let mut results = self.ci_results.lock();
        if let Some(existing) = results.iter_mut().find(|r| r.commit == result.commit && r.status == result.status) {
            *existing = result;
            return false;
        }
        if results.len() >= MAX_CI_RESULTS {
            results.pop_front();
        }
        results.push_back(result);
        true
    }

    #[must_use]
    pub fn ci_results(&self) -> Vec<CiResult> {
        self.ci_results.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Category, Severity};

    #[test]
    fn pending_alerts_evict_fifo_past_cap() {
        let buffer = AlertBuffer::new();
        for i in 0..MAX_PENDING_ALERTS + 5 {
            buffer.add_alert(Alert::new(Severity::Info, Category::Noise, format!("a{i}"), "d", "s"));
        }
        assert_eq!(buffer.pending_count(), MAX_PENDING_ALERTS);
        let drained = buffer.drain_alerts();
        assert!(drained.iter().any(|a| a.title == "a24"));
        assert!(!drained.iter().any(|a| a.title == "a0"));
    }

    #[test]
    fn drain_empties_the_pending_queue() {
        let buffer = AlertBuffer::new();
        buffer.add_alert(Alert::new(Severity::Error, Category::Anomaly, "x", "d", "s"));
        assert_eq!(buffer.pending_count(), 1);
        buffer.drain_alerts();
        assert_eq!(buffer.pending_count(), 0);
    }
}
