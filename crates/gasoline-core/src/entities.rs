//! Telemetry entities ingested from the browser agent.
//!
//! All entities are immutable once ingested — the capture pipeline
//! never mutates a stored item, only appends and evicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// An opaque console/structured log record.
///
/// Required keys are `level` and `message` (or `msg`); everything else
/// (`source`, `args`, `timestamp`, arbitrary extras) passes through
/// untouched, which is why this wraps a JSON object rather than a
/// fixed struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(pub Map<String, Value>);

impl LogEntry {
    /// The log level, if present under either key Browsers commonly
    /// use.
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.0.get("level").and_then(Value::as_str)
    }

    /// The message text, checking `message` then falling back to
    /// `msg`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.0
            .get("message")
            .or_else(|| self.0.get("msg"))
            .and_then(Value::as_str)
    }

    /// Returns true if this entry's level looks like an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.level(), Some(l) if l.eq_ignore_ascii_case("error"))
    }

    /// Returns true if this entry's level looks like a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self.level(), Some(l) if l.eq_ignore_ascii_case("warn") || l.eq_ignore_ascii_case("warning"))
    }
}

/// A captured network request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkBody {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub response_headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    /// Set when `response_body` was truncated at ingest.
    #[serde(default)]
    pub response_truncated: bool,
    #[serde(default)]
    pub size: u64,
    pub timestamp: DateTime<Utc>,
}

impl NetworkBody {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }

    /// The request path, stripped of scheme/host/query, used as the
    /// endpoint key for checkpoint diffing.
    #[must_use]
    pub fn path(&self) -> &str {
        let without_query = self.url.split('?').next().unwrap_or(&self.url);
        if let Some(idx) = without_query.find("://") {
            let rest = &without_query[idx + 3..];
            rest.find('/').map_or("/", |slash| &rest[slash..])
        } else {
            without_query
        }
    }
}

/// WebSocket connection lifecycle/message events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketEvent {
    /// Stable per-connection id; all events for one socket share it.
    pub id: String,
    pub url: String,
    pub event: WebSocketEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<WebSocketDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Value>,
    /// RFC3339Nano timestamp.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebSocketEventKind {
    Open,
    Message,
    Close,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebSocketDirection {
    Incoming,
    Outgoing,
}

/// A user-driven browser action (click, input, navigation, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub url: String,
    /// Epoch milliseconds, per spec (not RFC3339, unlike other entities).
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A page-load performance sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub url: String,
    pub timing: PerformanceTiming,
    pub network: NetworkSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cls: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTiming {
    pub load_ms: f64,
    pub ttfb_ms: f64,
    pub dcl_ms: f64,
    pub interactive_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcp_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub request_count: u32,
    pub transfer_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_reads_message_or_msg_fallback() {
        let mut map = Map::new();
        map.insert("level".into(), Value::String("error".into()));
        map.insert("msg".into(), Value::String("boom".into()));
        let entry = LogEntry(map);
        assert_eq!(entry.message(), Some("boom"));
        assert!(entry.is_error());
        assert!(!entry.is_warning());
    }

    #[test]
    fn network_body_path_strips_scheme_host_and_query() {
        let body = NetworkBody {
            url: "https://api.example.com/api/login?x=1".into(),
            method: "POST".into(),
            status: 500,
            duration_ms: 10,
            content_type: None,
            response_headers: HashMap::new(),
            response_body: None,
            response_truncated: false,
            size: 0,
            timestamp: Utc::now(),
        };
        assert_eq!(body.path(), "/api/login");
        assert!(body.is_failure());
    }
}
