//! Wire shape for the MCP `notifications/message` push the bridge writes
//! to stdout.

use gasoline_alerts::Alert;
use serde_json::{json, Value};

/// Event names an alert's category satisfies (spec §4.7's
/// category<->event mapping: `errors<->{anomaly, threshold}`;
/// `network_errors<->anomaly`; `performance/regression<->regression`;
/// `ci<->ci`; `security<->threshold`; `anomaly<->anomaly`;
/// `user_frustration<->anomaly`). A client subscribed to any one of the
/// returned names accepts the alert; `Noise` satisfies none of the
/// named events and only matches the `all` wildcard.
#[must_use]
pub fn satisfied_events(alert: &Alert) -> &'static [&'static str] {
    match alert.category {
        gasoline_alerts::Category::Anomaly => &["errors", "network_errors", "anomaly", "user_frustration"],
        gasoline_alerts::Category::Threshold => &["errors", "security"],
        gasoline_alerts::Category::Regression => &["performance", "regression"],
        gasoline_alerts::Category::Ci => &["ci"],
        gasoline_alerts::Category::Noise => &[],
    }
}

#[must_use]
pub fn severity_level(alert: &Alert) -> &'static str {
    match alert.severity {
        gasoline_alerts::Severity::Info => "info",
        gasoline_alerts::Severity::Warning => "warning",
        gasoline_alerts::Severity::Error => "error",
    }
}

/// Build a JSON-RPC notification envelope carrying `alert`.
#[must_use]
pub fn build(alert: &Alert) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "notifications/message",
        "params": {
            "level": severity_level(alert),
            "logger": "gasoline",
            "data": {
                "category": alert.category,
                "severity": severity_level(alert),
                "title": alert.title,
                "detail": alert.detail,
                "timestamp": alert.timestamp,
                "source": alert.source,
            }
        }
    })
}
