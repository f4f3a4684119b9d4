//! Regression detector: compares a new performance snapshot against a
//! per-URL baseline across six thresholds (spec §4.6).

use crate::alert::{Alert, Category, Severity};
use gasoline_core::entities::PerformanceSnapshot;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

pub const MAX_PENDING: usize = 10;

fn relative_exceeds(current: f64, baseline: f64, threshold: f64) -> bool {
    baseline > 0.0 && (current - baseline) / baseline > threshold
}

pub struct RegressionDetector {
    baselines: Mutex<HashMap<String, PerformanceSnapshot>>,
    pending: Mutex<VecDeque<(String, Alert)>>,
}

impl Default for RegressionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionDetector {
    #[must_use]
    pub fn new() -> Self {
        Self { baselines: Mutex::new(HashMap::new()), pending: Mutex::new(VecDeque::new()) }
    }

    /// Evaluate `snapshot` against the prior sample for its URL.
    /// Returns the fired regression alerts, if any. If a baseline
    /// existed and none of the thresholds fired, any previously
    /// pending alerts for this URL are resolved (removed).
    pub fn evaluate(&self, snapshot: &PerformanceSnapshot) -> Vec<Alert> {
        let previous = {
            let mut baselines = self.baselines.lock();
            baselines.insert(snapshot.url.clone(), snapshot.clone())
        };
        let Some(baseline) = previous else {
            return Vec::new();
        };

        let mut fired = Vec::new();
        if relative_exceeds(snapshot.timing.load_ms, baseline.timing.load_ms, 0.20) {
            fired.push(("load time", baseline.timing.load_ms, snapshot.timing.load_ms));
        }
        if let (Some(cur), Some(base)) = (snapshot.timing.fcp_ms, baseline.timing.fcp_ms) {
            if relative_exceeds(cur, base, 0.20) {
                fired.push(("first contentful paint", base, cur));
            }
        }
        if let (Some(cur), Some(base)) = (snapshot.timing.lcp_ms, baseline.timing.lcp_ms) {
            if relative_exceeds(cur, base, 0.20) {
                fired.push(("largest contentful paint", base, cur));
            }
        }
        if relative_exceeds(snapshot.timing.ttfb_ms, baseline.timing.ttfb_ms, 0.50) {
            fired.push(("time to first byte", baseline.timing.ttfb_ms, snapshot.timing.ttfb_ms));
        }
        if relative_exceeds(snapshot.network.transfer_bytes as f64, baseline.network.transfer_bytes as f64, 0.25) {
            fired.push(("transfer bytes", baseline.network.transfer_bytes as f64, snapshot.network.transfer_bytes as f64));
        }
        let cls_regressed = match (snapshot.cls, baseline.cls) {
            (Some(cur), Some(base)) => cur - base > 0.1,
            _ => false,
        };

        if fired.is_empty() && !cls_regressed {
            let mut pending = self.pending.lock();
            pending.retain(|(url, _)| url != &snapshot.url);
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for (metric, base, cur) in &fired {
            alerts.push(Alert::new(
                Severity::Warning,
                Category::Regression,
                format!("{metric} regressed on {}", snapshot.url),
                format!("{base:.0} -> {cur:.0} ({:+.0}%)", (cur - base) / base * 100.0),
                "regression_detector",
            ));
        }
        if cls_regressed {
            if let (Some(cur), Some(base)) = (snapshot.cls, baseline.cls) {
                alerts.push(Alert::new(
                    Severity::Warning,
                    Category::Regression,
                    format!("layout shift regressed on {}", snapshot.url),
                    format!("{base:.3} -> {cur:.3}"),
                    "regression_detector",
                ));
            }
        }

        let mut pending = self.pending.lock();
        for alert in &alerts {
            if pending.len() >= MAX_PENDING {
                pending.pop_front();
            }
            pending.push_back((snapshot.url.clone(), alert.clone()));
        }
        alerts
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gasoline_core::entities::{NetworkSummary, PerformanceTiming};

    fn snap(url: &str, load_ms: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            url: url.into(),
            timing: PerformanceTiming { load_ms, ttfb_ms: 100.0, dcl_ms: 200.0, interactive_ms: 300.0, fcp_ms: None, lcp_ms: None },
            network: NetworkSummary { request_count: 10, transfer_bytes: 1000 },
            cls: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn first_sample_never_fires_regression() {
        let detector = RegressionDetector::new();
        assert!(detector.evaluate(&snap("https://x/", 1000.0)).is_empty());
    }

    #[test]
    fn twenty_percent_load_increase_fires_and_resolves_on_recovery() {
        let detector = RegressionDetector::new();
        detector.evaluate(&snap("https://x/", 1000.0));
        let fired = detector.evaluate(&snap("https://x/", 1300.0));
        assert_eq!(fired.len(), 1);
        assert_eq!(detector.pending_count(), 1);

        let resolved = detector.evaluate(&snap("https://x/", 1000.0));
        assert!(resolved.is_empty());
        assert_eq!(detector.pending_count(), 0);
    }
}
