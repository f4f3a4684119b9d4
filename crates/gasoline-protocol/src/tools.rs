//! The fixed tool catalogue exposed by `tools/list`.
//!
//! Five tools, each sub-dispatching on a `what`/`action`/`format`
//! discriminator (spec §6) rather than the teacher's per-tool-per-
//! operation registry — the method surface here is closed by spec, so
//! a flat catalogue is simpler than a dynamic `HandlerRegistry`
//! (see DESIGN.md).

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// The five tools, in catalogue order: observe, analyze, generate,
/// configure, interact.
#[must_use]
pub fn catalogue() -> Vec<Tool> {
    vec![
        Tool {
            name: "observe",
            description: "Read captured browser telemetry: console logs, network bodies, \
                websocket events, user actions or performance snapshots, optionally as a \
                checkpoint diff.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "what": {
                        "type": "string",
                        "enum": ["console", "network", "websocket", "actions", "performance", "diff", "alerts"]
                    },
                    "checkpoint": { "type": "string" },
                    "severity": { "type": "string", "enum": ["all", "errors_only"] },
                    "url_filter": { "type": "string" },
                    "limit": { "type": "integer" }
                }
            }),
        },
        Tool {
            name: "analyze",
            description: "Compare captured state across time: verification verdicts, named \
                snapshot diffs, anomaly/regression summaries, or the temporal event graph.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "what": {
                        "type": "string",
                        "enum": ["verify_compare", "session_diff", "regressions", "temporal_events"]
                    },
                    "session_id": { "type": "string" },
                    "snapshot_name": { "type": "string" },
                    "since": { "type": "string" },
                    "event_type": { "type": "string" }
                }
            }),
        },
        Tool {
            name: "generate",
            description: "Produce a derived artifact from captured telemetry: a checkpoint, a \
                named snapshot, or a human-readable summary document.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "enum": ["checkpoint", "snapshot", "summary"]
                    },
                    "name": { "type": "string" },
                    "label": { "type": "string" }
                }
            }),
        },
        Tool {
            name: "configure",
            description: "Adjust daemon-side behavior: the push-notification stream, the CI \
                webhook correlation window, or checkpoint retention.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["stream_enable", "stream_disable", "stream_status"]
                    },
                    "events": { "type": "array", "items": { "type": "string" } },
                    "throttle_seconds": { "type": "integer" },
                    "severity_min": { "type": "string", "enum": ["info", "warning", "error"] },
                    "url_filter": { "type": "string" }
                }
            }),
        },
        Tool {
            name: "interact",
            description: "Drive a stateful workflow: start/watch/compare a verification \
                session, or create/compare a named session-diff snapshot.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["verify_start", "verify_watch", "verify_compare", "verify_cancel",
                                 "session_diff_create", "session_diff_compare"]
                    },
                    "session_id": { "type": "string" },
                    "label": { "type": "string" },
                    "url_filter": { "type": "string" },
                    "name": { "type": "string" }
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_five_tools_with_object_schemas() {
        let tools = catalogue();
        assert_eq!(tools.len(), 5);
        let names: Vec<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["observe", "analyze", "generate", "configure", "interact"]);
        for t in &tools {
            assert_eq!(t.input_schema["type"], "object");
            assert!(t.input_schema["properties"].is_object());
            let serialized = serde_json::to_value(t).unwrap();
            assert!(serialized.get("_meta").is_none());
        }
    }
}
