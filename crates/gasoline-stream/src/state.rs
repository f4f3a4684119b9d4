//! Runtime state for the push-notification stream: throttling, a
//! per-minute rate cap, and short-window dedup on top of the static
//! `StreamConfig` filters.

use crate::config::StreamConfig;
use crate::notification;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gasoline_alerts::Alert;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

const DEDUP_WINDOW_SECS: i64 = 30;
const MAX_PER_MINUTE: usize = 12;
const MAX_PENDING: usize = 100;

struct Inner {
    config: StreamConfig,
    last_notified: Option<DateTime<Utc>>,
    recent_emissions: VecDeque<DateTime<Utc>>,
    dedup: HashMap<String, DateTime<Utc>>,
    pending: Vec<Alert>,
    notify_count: u64,
}

pub struct StreamState {
    inner: Mutex<Inner>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

impl StreamState {
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                config,
                last_notified: None,
                recent_emissions: VecDeque::new(),
                dedup: HashMap::new(),
                pending: Vec::new(),
                notify_count: 0,
            }),
        }
    }

    /// Evaluate `alert` against the enable flag, severity floor, event
    /// filter, throttle window, per-minute rate cap, and short dedup
    /// window. Returns the notification payload to write when the
    /// alert clears every gate; the caller owns the actual stdout
    /// write since that mutex is shared with request/response framing.
    pub fn offer(&self, alert: &Alert) -> Option<Value> {
        let mut inner = self.inner.lock();
        if !inner.config.enabled {
            return None;
        }
        if alert.severity.rank() < inner.config.severity_rank() {
            return None;
        }
        if !inner.config.accepts_alert(alert) {
            return None;
        }

        let now = alert.timestamp;
        let throttle = ChronoDuration::seconds(inner.config.throttle_seconds as i64);
        if inner.last_notified.is_some_and(|last| now - last < throttle) {
            Self::push_pending(&mut inner.pending, alert.clone());
            return None;
        }

        let cutoff = now - ChronoDuration::seconds(60);
        while inner.recent_emissions.front().is_some_and(|&t| t < cutoff) {
            inner.recent_emissions.pop_front();
        }
        if inner.recent_emissions.len() >= MAX_PER_MINUTE {
            Self::push_pending(&mut inner.pending, alert.clone());
            return None;
        }

        let dedup_key = format!("{:?}:{}", alert.category, alert.title);
        if let Some(&last_seen) = inner.dedup.get(&dedup_key) {
            if now - last_seen < ChronoDuration::seconds(DEDUP_WINDOW_SECS) {
                return None;
            }
        }

        inner.last_notified = Some(now);
        inner.recent_emissions.push_back(now);
        inner.dedup.insert(dedup_key, now);
        inner.notify_count += 1;
        let dedup_cutoff = now - ChronoDuration::seconds(DEDUP_WINDOW_SECS);
        inner.dedup.retain(|_, ts| *ts >= dedup_cutoff);

        Some(notification::build(alert))
    }

    fn push_pending(pending: &mut Vec<Alert>, alert: Alert) {
        if pending.len() >= MAX_PENDING {
            pending.remove(0);
        }
        pending.push(alert);
    }

    pub fn enable(&self) {
        self.inner.lock().config.enabled = true;
    }

    pub fn disable(&self) {
        let mut inner = self.inner.lock();
        inner.config.enabled = false;
        inner.pending.clear();
        inner.dedup.clear();
    }

    pub fn configure(&self, config: StreamConfig) {
        self.inner.lock().config = config;
    }

    #[must_use]
    pub fn status(&self) -> StreamStatus {
        let inner = self.inner.lock();
        StreamStatus {
            config: inner.config.clone(),
            notify_count: inner.notify_count,
            pending_count: inner.pending.len(),
        }
    }

    /// Drain and return the alerts suppressed by throttle/rate limiting
    /// while the stream was active, oldest first.
    pub fn take_pending(&self) -> Vec<Alert> {
        std::mem::take(&mut self.inner.lock().pending)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StreamStatus {
    pub config: StreamConfig,
    pub notify_count: u64,
    pub pending_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoline_alerts::{Category, Severity};

    fn alert(title: &str, at: DateTime<Utc>) -> Alert {
        Alert { severity: Severity::Warning, category: Category::Regression, title: title.into(), detail: "d".into(), timestamp: at, source: "s".into(), count: 1, delivered_at: None }
    }

    #[test]
    fn disabled_stream_emits_nothing() {
        let state = StreamState::new(StreamConfig::default());
        assert!(state.offer(&alert("x", Utc::now())).is_none());
    }

    #[test]
    fn enabled_stream_emits_first_alert() {
        let state = StreamState::new(StreamConfig { enabled: true, ..Default::default() });
        assert!(state.offer(&alert("x", Utc::now())).is_some());
        assert_eq!(state.status().notify_count, 1);
    }

    #[test]
    fn throttle_window_suppresses_and_queues_pending() {
        let state = StreamState::new(StreamConfig { enabled: true, throttle_seconds: 5, ..Default::default() });
        let base = Utc::now();
        assert!(state.offer(&alert("a", base)).is_some());
        assert!(state.offer(&alert("b", base + ChronoDuration::seconds(1))).is_none());
        assert_eq!(state.status().pending_count, 1);
    }

    #[test]
    fn severity_floor_filters_low_severity() {
        let state = StreamState::new(StreamConfig { enabled: true, severity_min: "error".into(), ..Default::default() });
        let mut a = alert("x", Utc::now());
        a.severity = Severity::Warning;
        assert!(state.offer(&a).is_none());
    }

    #[test]
    fn dedup_suppresses_identical_title_within_window() {
        let state = StreamState::new(StreamConfig { enabled: true, throttle_seconds: 0, ..Default::default() });
        let base = Utc::now();
        assert!(state.offer(&alert("dup", base)).is_some());
        assert!(state.offer(&alert("dup", base + ChronoDuration::seconds(2))).is_none());
    }

    #[test]
    fn event_filter_accepts_alert_via_any_satisfied_event_name() {
        let state = StreamState::new(StreamConfig {
            enabled: true,
            events: vec!["user_frustration".into()],
            throttle_seconds: 0,
            ..Default::default()
        });
        let mut a = alert("x", Utc::now());
        a.category = Category::Anomaly;
        assert!(state.offer(&a).is_some());
    }

    #[test]
    fn event_filter_rejects_alert_outside_subscription() {
        let state = StreamState::new(StreamConfig {
            enabled: true,
            events: vec!["ci".into()],
            throttle_seconds: 0,
            ..Default::default()
        });
        let mut a = alert("x", Utc::now());
        a.category = Category::Threshold;
        assert!(state.offer(&a).is_none());
    }

    #[test]
    fn event_filter_noise_only_passes_under_all_wildcard() {
        let narrow = StreamState::new(StreamConfig {
            enabled: true,
            events: vec!["errors".into()],
            throttle_seconds: 0,
            ..Default::default()
        });
        let mut noisy = alert("x", Utc::now());
        noisy.category = Category::Noise;
        assert!(narrow.offer(&noisy).is_none());

        let wide = StreamState::new(StreamConfig { enabled: true, throttle_seconds: 0, ..Default::default() });
        assert!(wide.offer(&noisy).is_some());
    }

    #[test]
    fn disable_clears_pending_and_dedup() {
        let state = StreamState::new(StreamConfig { enabled: true, throttle_seconds: 5, ..Default::default() });
        let base = Utc::now();
        state.offer(&alert("a", base));
        state.offer(&alert("b", base + ChronoDuration::seconds(1)));
        assert_eq!(state.status().pending_count, 1);
        state.disable();
        assert_eq!(state.status().pending_count, 0);
    }
}
