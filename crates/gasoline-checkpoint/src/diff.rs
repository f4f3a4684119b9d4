//! Diff computation: reads everything newer than a resolved
//! checkpoint position and classifies it into console/network/
//! websocket/actions blocks (spec §4.4).

use crate::manager::ResolvedCheckpoint;
use chrono::{DateTime, Utc};
use gasoline_capture::CapturePipeline;
use gasoline_core::entities::{NetworkBody, WebSocketEventKind};
use gasoline_core::fingerprint::checkpoint_fingerprint;
use gasoline_core::json::approx_tokens;
use std::collections::{HashMap, HashSet};

pub const CONSOLE_CAP: usize = 50;
pub const NETWORK_CAP: usize = 50;
pub const ACTIONS_CAP: usize = 50;

/// Whether the caller wants warnings included (`all`) or dropped
/// (`errors_only`), applied to both console and websocket blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    All,
    ErrorsOnly,
}

/// The diff's overall classification: error > warning > clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiffSeverity {
    Clean,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleDiff {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NetworkFailure {
    pub path: String,
    pub status: u16,
    pub previous_status: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct NetworkDegraded {
    pub path: String,
    pub duration_ms: u64,
    pub baseline_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkDiff {
    pub new_endpoints: Vec<String>,
    pub failures: Vec<NetworkFailure>,
    pub degraded: Vec<NetworkDegraded>,
}

#[derive(Debug, Clone, Default)]
pub struct WebSocketDiff {
    pub connections: Vec<String>,
    pub disconnections: Vec<String>,
    pub errors: Vec<String>,
}

impl WebSocketDiff {
    fn is_empty_after_severity(&self, severity: Severity) -> bool {
        if severity == Severity::ErrorsOnly {
            self.errors.is_empty()
        } else {
            self.connections.is_empty() && self.disconnections.is_empty() && self.errors.is_empty()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub severity: DiffSeverity,
    pub summary: String,
    pub console: ConsoleDiff,
    pub network: NetworkDiff,
    pub websocket: Option<WebSocketDiff>,
    pub actions: Vec<String>,
    pub known_endpoints: HashMap<String, crate::checkpoint::EndpointInfo>,
    pub approx_tokens: usize,
}

/// Compute the diff between `resolved`'s position and the pipeline's
/// current state.
#[must_use]
pub fn compute(pipeline: &CapturePipeline, resolved: &ResolvedCheckpoint, severity_filter: Severity) -> DiffResult {
    let cursor = gasoline_core::ring_buffer::BufferCursor::new(resolved.positions.logs);
    let (logs, _gap, _) = pipeline.logs_since(cursor);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_errors = HashSet::new();
    let mut seen_warnings = HashSet::new();
    for entry in &logs {
        let Some(message) = entry.message() else { continue };
        let fp = checkpoint_fingerprint(message);
        if entry.is_error() {
            if seen_errors.insert(fp) && errors.len() < CONSOLE_CAP {
                errors.push(message.to_string());
            }
        } else if entry.is_warning() && severity_filter == Severity::All {
            if seen_warnings.insert(fp) && warnings.len() < CONSOLE_CAP {
                warnings.push(message.to_string());
            }
        }
    }
    let console = ConsoleDiff { errors, warnings };

    let net_cursor = gasoline_core::ring_buffer::BufferCursor::new(resolved.positions.network);
    let (bodies, _gap, _) = pipeline.network_since(net_cursor);
    let network = classify_network(&bodies, &resolved.known_endpoints);

    let ws_cursor = gasoline_core::ring_buffer::BufferCursor::new(resolved.positions.websocket);
    let (ws_events, _gap, _) = pipeline.websocket_since(ws_cursor);
    let websocket = classify_websocket(&ws_events, severity_filter);

    let actions_cursor = gasoline_core::ring_buffer::BufferCursor::new(resolved.positions.actions);
    let (actions, _gap, _) = pipeline.actions_since(actions_cursor);
    let actions: Vec<String> = actions
        .into_iter()
        .rev()
        .take(ACTIONS_CAP)
        .map(|a| format!("{} {}", a.action_type, a.url))
        .collect();

    let severity = derive_severity(&console, &network, websocket.as_ref(), severity_filter);
    let summary = build_summary(severity, &console, &network, websocket.as_ref(), &actions);

    let mut known_endpoints = resolved.known_endpoints.clone();
    known_endpoints.extend(network_endpoint_snapshot(&bodies));

    let mut result = DiffResult {
        severity,
        summary,
        console,
        network,
        websocket,
        actions,
        known_endpoints,
        approx_tokens: 0,
    };
    result.approx_tokens = approx_tokens(&to_json(&result));
    result
}

fn classify_network(
    bodies: &[NetworkBody],
    known: &HashMap<String, crate::checkpoint::EndpointInfo>,
) -> NetworkDiff {
    let mut new_endpoints = Vec::new();
    let mut failures = Vec::new();
    let mut degraded = Vec::new();
    let mut seen_paths = HashSet::new();
    let mut previous_status: HashMap<String, u16> = HashMap::new();

    for body in bodies {
        let path = body.path().to_string();
        let previous = previous_status.get(&path).copied().or_else(|| known.get(&path).map(|e| e.status));

        if !known.contains_key(&path) && seen_paths.insert(path.clone()) && new_endpoints.len() < NETWORK_CAP {
            new_endpoints.push(path.clone());
        }

        if body.is_failure() && previous.is_none_or(|p| p < 400) && failures.len() < NETWORK_CAP {
            failures.push(NetworkFailure {
                path: path.clone(),
                status: body.status,
                previous_status: previous,
            });
        }

        if let Some(baseline) = known.get(&path).map(|e| e.baseline_duration_ms) {
            if baseline > 0 && body.duration_ms > baseline * 3 && degraded.len() < NETWORK_CAP {
                degraded.push(NetworkDegraded {
                    path: path.clone(),
                    duration_ms: body.duration_ms,
                    baseline_ms: baseline,
                });
            }
        }

        previous_status.insert(path, body.status);
    }

    NetworkDiff { new_endpoints, failures, degraded }
}

fn network_endpoint_snapshot(bodies: &[NetworkBody]) -> HashMap<String, crate::checkpoint::EndpointInfo> {
    let mut snapshot = HashMap::new();
    for body in bodies {
        snapshot.insert(
            body.path().to_string(),
            crate::checkpoint::EndpointInfo { status: body.status, baseline_duration_ms: body.duration_ms },
        );
    }
    snapshot
}

fn classify_websocket(
    events: &[gasoline_core::entities::WebSocketEvent],
    severity_filter: Severity,
) -> Option<WebSocketDiff> {
    let mut diff = WebSocketDiff::default();
    for ev in events {
        match ev.event {
            WebSocketEventKind::Open => diff.connections.push(ev.id.clone()),
            WebSocketEventKind::Close => diff.disconnections.push(ev.id.clone()),
            WebSocketEventKind::Error => diff.errors.push(ev.id.clone()),
            WebSocketEventKind::Message => {}
        }
    }
    if severity_filter == Severity::ErrorsOnly {
        diff.connections.clear();
        diff.disconnections.clear();
    }
    if diff.is_empty_after_severity(severity_filter) {
        None
    } else {
        Some(diff)
    }
}

fn derive_severity(
    console: &ConsoleDiff,
    network: &NetworkDiff,
    websocket: Option<&WebSocketDiff>,
    severity_filter: Severity,
) -> DiffSeverity {
    if !console.errors.is_empty() || !network.failures.is_empty() || websocket.is_some_and(|w| !w.errors.is_empty()) {
        return DiffSeverity::Error;
    }
    let has_warning = (severity_filter == Severity::All && !console.warnings.is_empty())
        || !network.degraded.is_empty()
        || !network.new_endpoints.is_empty();
    if has_warning {
        DiffSeverity::Warning
    } else {
        DiffSeverity::Clean
    }
}

fn build_summary(
    severity: DiffSeverity,
    console: &ConsoleDiff,
    network: &NetworkDiff,
    websocket: Option<&WebSocketDiff>,
    actions: &[String],
) -> String {
    if severity == DiffSeverity::Clean
        && console.warnings.is_empty()
        && network.new_endpoints.is_empty()
        && actions.is_empty()
        && websocket.is_none()
    {
        return "no changes since checkpoint".to_string();
    }
    let mut parts = Vec::new();
    if !console.errors.is_empty() {
        parts.push(format!("{} console error(s)", console.errors.len()));
    }
    if !console.warnings.is_empty() {
        parts.push(format!("{} console warning(s)", console.warnings.len()));
    }
    if !network.failures.is_empty() {
        parts.push(format!("{} network failure(s)", network.failures.len()));
    }
    if !network.degraded.is_empty() {
        parts.push(format!("{} degraded endpoint(s)", network.degraded.len()));
    }
    if !network.new_endpoints.is_empty() {
        parts.push(format!("{} new endpoint(s)", network.new_endpoints.len()));
    }
    if let Some(ws) = websocket {
        if !ws.errors.is_empty() {
            parts.push(format!("{} websocket error(s)", ws.errors.len()));
        }
        if !ws.disconnections.is_empty() {
            parts.push(format!("{} websocket disconnection(s)", ws.disconnections.len()));
        }
    }
    if !actions.is_empty() {
        parts.push(format!("{} action(s)", actions.len()));
    }
    if parts.is_empty() {
        "no changes since checkpoint".to_string()
    } else {
        parts.join(", ")
    }
}

fn to_json(result: &DiffResult) -> serde_json::Value {
    serde_json::json!({
        "severity": format!("{:?}", result.severity),
        "summary": result.summary,
        "console": { "errors": result.console.errors, "warnings": result.console.warnings },
        "network": {
            "new_endpoints": result.network.new_endpoints,
            "failures": result.network.failures.iter().map(|f| serde_json::json!({
                "path": f.path, "status": f.status, "previous_status": f.previous_status,
            })).collect::<Vec<_>>(),
            "degraded": result.network.degraded.iter().map(|d| serde_json::json!({
                "path": d.path, "duration_ms": d.duration_ms, "baseline_ms": d.baseline_ms,
            })).collect::<Vec<_>>(),
        },
        "actions": result.actions,
    })
}

/// Parse a checkpoint-resolution timestamp string (RFC3339/Nano).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{CheckpointManager, CheckpointQuery};
    use chrono::Utc as ChronoUtc;
    use gasoline_capture::{CaptureConfig, CapturePipeline};
    use gasoline_core::entities::{LogEntry, NetworkBody};
    use serde_json::{Map, Value};
    use std::collections::HashMap as Map2;

    fn log(level: &str, msg: &str) -> LogEntry {
        let mut m = Map::new();
        m.insert("level".into(), Value::String(level.into()));
        m.insert("message".into(), Value::String(msg.into()));
        LogEntry(m)
    }

    fn net(url: &str, status: u16, duration_ms: u64) -> NetworkBody {
        NetworkBody {
            url: url.into(),
            method: "GET".into(),
            status,
            duration_ms,
            content_type: None,
            response_headers: Map2::new(),
            response_body: None,
            response_truncated: false,
            size: 0,
            timestamp: ChronoUtc::now(),
        }
    }

    #[test]
    fn console_errors_are_deduped_by_fingerprint_and_capped() {
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        pipeline.ingest_logs(vec![
            log("error", "boom at 2024-01-02T03:04:05Z"),
            log("error", "boom at 2024-05-06T07:08:09Z"),
            log("error", "totally different"),
        ]);
        let mgr = CheckpointManager::new();
        let resolved = mgr.resolve(&CheckpointQuery::default(), None, &pipeline, 0);
        let diff = compute(&pipeline, &resolved, Severity::All);
        assert_eq!(diff.console.errors.len(), 2);
        assert_eq!(diff.severity, DiffSeverity::Error);
    }

    #[test]
    fn status_transition_500_to_200_is_not_counted_as_failure() {
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        pipeline.ingest_network(vec![net("https://x/api/login", 500, 10), net("https://x/api/login", 200, 10)]);
        let mgr = CheckpointManager::new();
        let resolved = mgr.resolve(&CheckpointQuery::default(), None, &pipeline, 0);
        let diff = compute(&pipeline, &resolved, Severity::All);
        // Only the first 500 (no prior status) counts as a failure.
        assert_eq!(diff.network.failures.len(), 1);
        assert_eq!(diff.network.failures[0].status, 500);
    }

    #[test]
    fn errors_only_severity_drops_warnings() {
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        pipeline.ingest_logs(vec![log("warning", "careful"), log("error", "boom")]);
        let mgr = CheckpointManager::new();
        let resolved = mgr.resolve(&CheckpointQuery::default(), None, &pipeline, 0);
        let diff = compute(&pipeline, &resolved, Severity::ErrorsOnly);
        assert!(diff.console.warnings.is_empty());
        assert_eq!(diff.console.errors.len(), 1);
    }
}
