//! `compare(id)`: the verification verdict computation (spec §4.5).

use crate::session::Baseline;
use gasoline_capture::CapturePipeline;
use gasoline_core::fingerprint::verify_fingerprint;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NoIssuesDetected,
    Fixed,
    Regressed,
    DifferentIssue,
    Improved,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ErrorChange {
    pub message: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Resolved,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct CompareResult {
    pub verdict: Verdict,
    pub changes: Vec<ErrorChange>,
    pub new_network_errors: Vec<String>,
    pub performance_diff: Option<String>,
}

/// Compute the three error sets (new, resolved, unchanged) via
/// normalized-message matching, then classify a verdict by the fixed
/// priority order (spec §4.5).
#[must_use]
pub fn compare(baseline: &Baseline, pipeline: &CapturePipeline, url_filter: Option<&str>) -> CompareResult {
    let current = crate::session::capture_baseline(pipeline, url_filter);

    let baseline_fps: HashSet<String> = baseline.console_errors.iter().map(|m| verify_fingerprint(m)).collect();
    let current_fps: HashSet<String> = current.console_errors.iter().map(|m| verify_fingerprint(m)).collect();

    let mut changes = Vec::new();
    let mut resolved_count = 0;
    for msg in &baseline.console_errors {
        let fp = verify_fingerprint(msg);
        if current_fps.contains(&fp) {
            changes.push(ErrorChange { message: msg.clone(), kind: ChangeKind::Unchanged });
        } else {
            resolved_count += 1;
            changes.push(ErrorChange { message: msg.clone(), kind: ChangeKind::Resolved });
        }
    }
    let mut new_count = 0;
    for msg in &current.console_errors {
        let fp = verify_fingerprint(msg);
        if !baseline_fps.contains(&fp) {
            new_count += 1;
            changes.push(ErrorChange { message: msg.clone(), kind: ChangeKind::New });
        }
    }

    let baseline_count = baseline.console_errors.len();
    let current_count = current.console_errors.len();

    let verdict = if baseline_count == 0 && current_count == 0 {
        Verdict::NoIssuesDetected
    } else if resolved_count == baseline_count && new_count == 0 {
        Verdict::Fixed
    } else if current_count > baseline_count {
        Verdict::Regressed
    } else if resolved_count == baseline_count && new_count > 0 {
        Verdict::DifferentIssue
    } else if new_count == 0 && current_count < baseline_count {
        Verdict::Improved
    } else {
        Verdict::Unchanged
    };

    let baseline_net: HashSet<&str> = baseline.network_errors.iter().map(String::as_str).collect();
    let new_network_errors = current
        .network_errors
        .iter()
        .filter(|e| !baseline_net.contains(e.as_str()))
        .cloned()
        .collect();

    let performance_diff = match (baseline.load_time_ms, current.load_time_ms) {
        (Some(before), Some(after)) => Some(format!("{before:.0}ms -> {after:.0}ms")),
        _ => None,
    };

    CompareResult { verdict, changes, new_network_errors, performance_diff }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoline_capture::CaptureConfig;
    use gasoline_core::entities::LogEntry;
    use serde_json::{Map, Value};

    fn log(level: &str, msg: &str) -> LogEntry {
        let mut m = Map::new();
        m.insert("level".into(), Value::String(level.into()));
        m.insert("message".into(), Value::String(msg.into()));
        LogEntry(m)
    }

    #[test]
    fn fixed_when_all_baseline_errors_resolved_and_none_new() {
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        pipeline.ingest_logs(vec![log("error", "boom")]);
        let baseline = crate::session::capture_baseline(&pipeline, None);
        assert_eq!(baseline.console_errors.len(), 1);

        // A fresh pipeline simulates the error having gone away.
        let after = CapturePipeline::new(CaptureConfig::default());
        let result = compare(&baseline, &after, None);
        assert_eq!(result.verdict, Verdict::Fixed);
        assert!(result.changes.iter().all(|c| c.kind == ChangeKind::Resolved));
    }

    #[test]
    fn regressed_when_error_count_increases() {
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        pipeline.ingest_logs(vec![log("error", "boom")]);
        let baseline = crate::session::capture_baseline(&pipeline, None);

        pipeline.ingest_logs(vec![log("error", "another one")]);
        let result = compare(&baseline, &pipeline, None);
        assert_eq!(result.verdict, Verdict::Regressed);
    }

    #[test]
    fn no_issues_detected_when_baseline_and_current_both_empty() {
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        let baseline = crate::session::capture_baseline(&pipeline, None);
        let result = compare(&baseline, &pipeline, None);
        assert_eq!(result.verdict, Verdict::NoIssuesDetected);
    }
}
