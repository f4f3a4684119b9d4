//! The alert pipeline as a pure function: dedupe -> correlate -> sort
//! (spec §9: "alert pipeline as a pure function").

use crate::alert::{Alert, Category, Severity};
use std::collections::HashMap;

const CORRELATION_WINDOW_SECS: i64 = 5;

/// Merge alerts sharing (title, category): first occurrence kept,
/// count bumped, latest timestamp retained. A final count of 1 is
/// reset to 0 so the formatter can omit the merge badge for
/// never-repeated alerts (spec §4.6 step 1).
#[must_use]
pub fn dedupe(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut merged: Vec<Alert> = Vec::new();
    let mut index: HashMap<(String, Category), usize> = HashMap::new();
    for alert in alerts {
        let key = (alert.title.clone(), alert.category);
        if let Some(&idx) = index.get(&key) {
            merged[idx].count += 1;
            if alert.timestamp > merged[idx].timestamp {
                merged[idx].timestamp = alert.timestamp;
            }
        } else {
            index.insert(key, merged.len());
            let mut alert = alert;
            alert.count = 1;
            merged.push(alert);
        }
    }
    for alert in &mut merged {
        if alert.count == 1 {
            alert.count = 0;
        }
    }
    merged
}

/// Pair up regression<->anomaly alerts within a 5-second window into
/// a single compound alert (spec §4.6 step 2).
#[must_use]
pub fn correlate(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut used = vec![false; alerts.len()];
    let mut result = Vec::with_capacity(alerts.len());

    for i in 0..alerts.len() {
        if used[i] || alerts[i].category != Category::Regression {
            continue;
        }
        let partner = (0..alerts.len()).find(|&j| {
            !used[j]
                && j != i
                && alerts[j].category == Category::Anomaly
                && (alerts[i].timestamp - alerts[j].timestamp).num_seconds().abs() <= CORRELATION_WINDOW_SECS
        });
        if let Some(j) = partner {
            used[i] = true;
            used[j] = true;
            let (a, b) = (&alerts[i], &alerts[j]);
            let severity = a.severity.max(b.severity);
            let timestamp = a.timestamp.max(b.timestamp);
            result.push(Alert {
                severity,
                category: Category::Regression,
                title: format!("Correlated: {} + {}", a.title, b.title),
                detail: format!("{} | {}", a.detail, b.detail),
                timestamp,
                source: "correlator".to_string(),
                count: 0,
                delivered_at: None,
            });
        }
    }

    for (i, alert) in alerts.into_iter().enumerate() {
        if !used[i] {
            result.push(alert);
        }
    }
    result
}

/// Stable sort: severity rank descending, then timestamp descending
/// (spec §4.6 step 3).
#[must_use]
pub fn sort(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()).then(b.timestamp.cmp(&a.timestamp)));
    alerts
}

/// The full pipeline: dedupe -> correlate -> sort.
#[must_use]
pub fn drain(alerts: Vec<Alert>) -> Vec<Alert> {
    sort(correlate(dedupe(alerts)))
}

/// For 4+ alerts, a one-line summary in fixed category order (spec
/// §4.6 formatting rule).
#[must_use]
pub fn summary_line(alerts: &[Alert]) -> Option<String> {
    if alerts.len() < 4 {
        return None;
    }
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for a in alerts {
        *counts.entry(a.category).or_insert(0) += 1;
    }
    let parts: Vec<String> = crate::alert::CATEGORY_ORDER
        .iter()
        .filter_map(|c| counts.get(c).map(|n| format!("{n} {}", format!("{c:?}").to_lowercase())))
        .collect();
    Some(format!("{} alerts: {}", alerts.len(), parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn alert_at(category: Category, title: &str, severity: Severity, offset_secs: i64) -> Alert {
        let mut a = Alert::new(severity, category, title, "detail", "test");
        a.timestamp = chrono::Utc::now() + ChronoDuration::seconds(offset_secs);
        a
    }

    #[test]
    fn s4_dedup_and_correlate_scenario() {
        let a = alert_at(Category::Regression, "Load slow", Severity::Warning, 0);
        let b = alert_at(Category::Regression, "Load slow", Severity::Warning, 1);
        let c = alert_at(Category::Anomaly, "Spike", Severity::Error, 2);
        let result = drain(vec![a, b, c]);
        assert_eq!(result.len(), 2);
        let compound = result.iter().find(|a| a.title.starts_with("Correlated")).unwrap();
        assert_eq!(compound.title, "Correlated: Load slow + Spike");
        assert_eq!(compound.category, Category::Regression);
        assert_eq!(compound.severity, Severity::Error);
        let merged = result.iter().find(|a| a.title == "Load slow");
        assert!(merged.is_none(), "the merged Load slow alert was consumed by correlation");
    }

    #[test]
    fn dedupe_merges_matching_title_and_category_bumping_count() {
        let a = alert_at(Category::Regression, "Load slow", Severity::Warning, 0);
        let b = alert_at(Category::Regression, "Load slow", Severity::Warning, 1);
        let merged = dedupe(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].count, 2);
    }

    #[test]
    fn singleton_count_resets_to_zero() {
        let a = alert_at(Category::Noise, "Only once", Severity::Info, 0);
        let merged = dedupe(vec![a]);
        assert_eq!(merged[0].count, 0);
    }

    #[test]
    fn sort_orders_by_severity_desc_then_timestamp_desc() {
        let low = alert_at(Category::Noise, "low", Severity::Info, 0);
        let high_old = alert_at(Category::Threshold, "high old", Severity::Error, -10);
        let high_new = alert_at(Category::Threshold, "high new", Severity::Error, 0);
        let sorted = sort(vec![low.clone(), high_old.clone(), high_new.clone()]);
        assert_eq!(sorted[0].title, "high new");
        assert_eq!(sorted[1].title, "high old");
        assert_eq!(sorted[2].title, "low");
    }

    #[test]
    fn summary_line_only_appears_at_four_or_more_alerts() {
        let three = vec![
            alert_at(Category::Noise, "a", Severity::Info, 0),
            alert_at(Category::Noise, "b", Severity::Info, 0),
            alert_at(Category::Noise, "c", Severity::Info, 0),
        ];
        assert!(summary_line(&three).is_none());
        let four = [three, vec![alert_at(Category::Noise, "d", Severity::Info, 0)]].concat();
        assert!(summary_line(&four).is_some());
    }
}
