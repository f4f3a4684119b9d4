//! `observe`: read captured telemetry, optionally as a checkpoint
//! diff (spec §4.1/§4.3/§4.4/§4.6).

use super::common::{apply_limit, checkpoint_query, optional_str, optional_usize, required_str, severity_filter};
use crate::state::AppState;
use gasoline_clients::Client;
use gasoline_core::GasolineError;
use serde_json::{json, Value};

const DEFAULT_LIMIT: usize = 100;

pub async fn handle(state: &AppState, client: &Client, params: &Value) -> Result<Value, GasolineError> {
    let what = required_str(params, "what")?;
    let limit = optional_usize(params, "limit");

    match what.as_str() {
        "console" => Ok(observe_console(state, client, limit)),
        "network" => Ok(observe_network(state, client, params, limit)),
        "websocket" => Ok(observe_websocket(state, client, limit)),
        "actions" => Ok(observe_actions(state, client, limit)),
        "performance" => Ok(observe_performance(state, client, limit)),
        "diff" => Ok(observe_diff(state, client, params)),
        "alerts" => Ok(observe_alerts(state, limit)),
        other => Err(GasolineError::InvalidParameterValue {
            name: "what".into(),
            reason: format!("unknown observation '{other}'"),
        }),
    }
}

fn observe_console(state: &AppState, client: &Client, limit: Option<usize>) -> Value {
    let (entries, gap, advanced) = state.pipeline.logs_since(client.cursors.logs);
    state.clients.update_cursor(&client.id, |c| c.logs = advanced);
    let entries = apply_limit(entries, limit, DEFAULT_LIMIT);
    json!({
        "entries": entries.into_iter().map(|e| Value::Object(e.0)).collect::<Vec<_>>(),
        "gap": gap,
        "cursor": advanced.position,
    })
}

fn observe_network(state: &AppState, client: &Client, params: &Value, limit: Option<usize>) -> Value {
    let (mut bodies, gap, advanced) = state.pipeline.network_since(client.cursors.network);
    state.clients.update_cursor(&client.id, |c| c.network = advanced);
    if let Some(filter) = optional_str(params, "url_filter") {
        bodies.retain(|b| b.url.contains(&filter));
    }
    let bodies = apply_limit(bodies, limit, DEFAULT_LIMIT);
    json!({
        "entries": bodies,
        "gap": gap,
        "cursor": advanced.position,
    })
}

fn observe_websocket(state: &AppState, client: &Client, limit: Option<usize>) -> Value {
    let (events, gap, advanced) = state.pipeline.websocket_since(client.cursors.websocket);
    state.clients.update_cursor(&client.id, |c| c.websocket = advanced);
    let events = apply_limit(events, limit, DEFAULT_LIMIT);
    json!({ "entries": events, "gap": gap, "cursor": advanced.position })
}

fn observe_actions(state: &AppState, client: &Client, limit: Option<usize>) -> Value {
    let (actions, gap, advanced) = state.pipeline.actions_since(client.cursors.actions);
    state.clients.update_cursor(&client.id, |c| c.actions = advanced);
    let actions = apply_limit(actions, limit, DEFAULT_LIMIT);
    json!({ "entries": actions, "gap": gap, "cursor": advanced.position })
}

fn observe_performance(state: &AppState, client: &Client, limit: Option<usize>) -> Value {
    let (snapshots, gap, advanced) = state.pipeline.performance_since(client.cursors.performance);
    state.clients.update_cursor(&client.id, |c| c.performance = advanced);
    let snapshots = apply_limit(snapshots, limit, DEFAULT_LIMIT.min(50));
    json!({ "entries": snapshots, "gap": gap, "cursor": advanced.position })
}

fn observe_diff(state: &AppState, client: &Client, params: &Value) -> Value {
    let query = checkpoint_query(params);
    let severity = severity_filter(params);
    let client_id = if client.id.is_empty() { None } else { Some(client.id.as_str()) };
    let resolved = state.checkpoints.resolve(&query, client_id, &state.pipeline, state.alert_log.watermark());
    let diff = gasoline_checkpoint::compute(&state.pipeline, &resolved, severity);

    let undelivered = state.alert_log.since(resolved.alert_watermark);

    if resolved.is_auto {
        state.checkpoints.advance_auto(state.pipeline.positions(), diff.known_endpoints.clone(), state.alert_log.watermark());
    }

    json!({
        "severity": format!("{:?}", diff.severity).to_lowercase(),
        "summary": diff.summary,
        "console": { "errors": diff.console.errors, "warnings": diff.console.warnings },
        "network": {
            "new_endpoints": diff.network.new_endpoints,
            "failures": diff.network.failures.iter().map(|f| json!({
                "path": f.path, "status": f.status, "previous_status": f.previous_status,
            })).collect::<Vec<_>>(),
            "degraded": diff.network.degraded.iter().map(|d| json!({
                "path": d.path, "duration_ms": d.duration_ms, "baseline_ms": d.baseline_ms,
            })).collect::<Vec<_>>(),
        },
        "websocket": diff.websocket.map(|w| json!({
            "connections": w.connections, "disconnections": w.disconnections, "errors": w.errors,
        })),
        "actions": diff.actions,
        "pending_alerts": undelivered.iter().map(alert_json).collect::<Vec<_>>(),
        "approx_tokens": diff.approx_tokens,
    })
}

fn observe_alerts(state: &AppState, limit: Option<usize>) -> Value {
    let all = state.alert_log.since(0);
    let capped = apply_limit(all, limit, DEFAULT_LIMIT);
    json!({
        "alerts": capped.iter().map(alert_json).collect::<Vec<_>>(),
        "pending_count": state.alert_buffer.pending_count(),
        "watermark": state.alert_log.watermark(),
    })
}

fn alert_json(alert: &gasoline_alerts::Alert) -> Value {
    json!({
        "severity": alert.severity,
        "category": alert.category,
        "title": alert.title,
        "detail": alert.detail,
        "timestamp": alert.timestamp,
        "source": alert.source,
        "count": alert.count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use gasoline_core::entities::LogEntry;
    use serde_json::Map;

    fn log(level: &str, msg: &str) -> LogEntry {
        let mut m = Map::new();
        m.insert("level".into(), Value::String(level.into()));
        m.insert("message".into(), Value::String(msg.into()));
        LogEntry(m)
    }

    #[tokio::test]
    async fn console_observation_advances_the_clients_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        state.pipeline.ingest_logs(vec![log("error", "boom")]);
        let client = state.clients.register("/proj");

        let result = handle(&state, &client, &json!({ "what": "console" })).await.unwrap();
        assert_eq!(result["entries"].as_array().unwrap().len(), 1);

        let client = state.clients.get_or_default(&client.id);
        let result = handle(&state, &client, &json!({ "what": "console" })).await.unwrap();
        assert_eq!(result["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_what_is_an_invalid_parameter_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let client = state.clients.get_or_default("");
        let err = handle(&state, &client, &json!({ "what": "bogus" })).await.unwrap_err();
        assert_eq!(err.code(), "invalid_parameter_value");
    }
}
