//! Anomaly detector: error-rate spikes over a rolling 60s window
//! (spec §4.6).

use crate::alert::{Alert, Category, Severity};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;

const WINDOW_SECS: i64 = 60;
const RECENT_SECS: i64 = 10;
const BUCKETS: f64 = 6.0;
const SUPPRESS_WINDOW_SECS: i64 = 10;

pub struct AnomalyDetector {
    timestamps: Mutex<VecDeque<DateTime<Utc>>>,
    last_emitted: Mutex<Option<DateTime<Utc>>>,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector {
    #[must_use]
    pub fn new() -> Self {
        Self { timestamps: Mutex::new(VecDeque::new()), last_emitted: Mutex::new(None) }
    }

    /// Record an error occurrence; returns an anomaly alert if the
    /// recent (10s) rate exceeds 3x the rolling average and no
    /// anomaly was emitted from this source in the past 10s.
    pub fn record_error(&self, at: DateTime<Utc>) -> Option<Alert> {
        let (recent, total) = {
            let mut timestamps = self.timestamps.lock();
            timestamps.push_back(at);
            let cutoff = at - ChronoDuration::seconds(WINDOW_SECS);
            while timestamps.front().is_some_and(|&t| t < cutoff) {
                timestamps.pop_front();
            }
            if timestamps.len() < 2 {
                return None;
            }
            let recent_cutoff = at - ChronoDuration::seconds(RECENT_SECS);
            let recent = timestamps.iter().filter(|&&t| t >= recent_cutoff).count();
            (recent, timestamps.len())
        };

        let rolling_avg = total as f64 / BUCKETS;
        if (recent as f64) <= 3.0 * rolling_avg {
            return None;
        }

        let mut last_emitted = self.last_emitted.lock();
        if last_emitted.is_some_and(|last| (at - last).num_seconds() < SUPPRESS_WINDOW_SECS) {
            return None;
        }
        *last_emitted = Some(at);
        Some(Alert {
            severity: Severity::Warning,
            category: Category::Anomaly,
            title: "Error rate spike".to_string(),
            detail: format!("{recent} errors in the last {RECENT_SECS}s vs rolling average {rolling_avg:.1}"),
            timestamp: at,
            source: "anomaly_detector".to_string(),
            count: 1,
            delivered_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_emits_once_within_suppress_window() {
        let detector = AnomalyDetector::new();
        let base = Utc::now();
        assert!(detector.record_error(base).is_none());
        let mut emitted = 0;
        for i in 1..8 {
            let at = base + ChronoDuration::seconds(i);
            if detector.record_error(at).is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 1);
    }

    #[test]
    fn steady_low_rate_never_emits() {
        let detector = AnomalyDetector::new();
        let base = Utc::now();
        for i in 0..10 {
            let at = base + ChronoDuration::seconds(i * 15);
            assert!(detector.record_error(at).is_none());
        }
    }
}
