//! `generate`: produce a derived artifact from captured telemetry
//! (spec §4.1/§4.4/§4.5).

use super::common::required_str;
use crate::state::AppState;
use gasoline_checkpoint::{CheckpointQuery, Severity};
use gasoline_clients::Client;
use gasoline_core::GasolineError;
use serde_json::{json, Value};

pub async fn handle(state: &AppState, client: &Client, params: &Value) -> Result<Value, GasolineError> {
    let format = required_str(params, "format")?;
    match format.as_str() {
        "checkpoint" => checkpoint(state, client, params),
        "snapshot" => snapshot(state, params),
        "summary" => Ok(summary(state, client, params)),
        other => Err(GasolineError::InvalidParameterValue {
            name: "format".into(),
            reason: format!("unknown artifact '{other}'"),
        }),
    }
}

fn checkpoint(state: &AppState, client: &Client, params: &Value) -> Result<Value, GasolineError> {
    let name = required_str(params, "name")?;
    let client_id = if client.id.is_empty() { None } else { Some(client.id.as_str()) };
    state.checkpoints.create(&name, client_id, state.pipeline.positions(), state.alert_log.watermark())?;
    Ok(json!({ "name": name, "created": true }))
}

fn snapshot(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let name = required_str(params, "name")?;
    state.snapshots.create(&name, &state.pipeline)?;
    Ok(json!({ "name": name, "created": true }))
}

fn summary(state: &AppState, client: &Client, params: &Value) -> Value {
    let label = super::common::optional_str(params, "label");
    let client_id = if client.id.is_empty() { None } else { Some(client.id.as_str()) };
    let resolved = state.checkpoints.resolve(&CheckpointQuery::default(), client_id, &state.pipeline, state.alert_log.watermark());
    let diff = gasoline_checkpoint::compute(&state.pipeline, &resolved, Severity::All);

    let mut lines = Vec::new();
    lines.push(format!("# {}", label.as_deref().unwrap_or("Session Summary")));
    lines.push(String::new());
    lines.push(format!("Overall severity: **{:?}**", diff.severity));
    lines.push(diff.summary.clone());
    if !diff.console.errors.is_empty() {
        lines.push(String::new());
        lines.push("## Console errors".to_string());
        for e in &diff.console.errors {
            lines.push(format!("- {e}"));
        }
    }
    if !diff.network.failures.is_empty() {
        lines.push(String::new());
        lines.push("## Network failures".to_string());
        for f in &diff.network.failures {
            lines.push(format!("- {} -> {}", f.path, f.status));
        }
    }
    let document = lines.join("\n");
    json!({ "document": document, "severity": format!("{:?}", diff.severity) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn checkpoint_generation_requires_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let client = state.clients.get_or_default("");
        let err = handle(&state, &client, &json!({ "format": "checkpoint" })).await.unwrap_err();
        assert_eq!(err.code(), "missing_parameter");
    }

    #[tokio::test]
    async fn summary_always_succeeds_even_with_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let client = state.clients.get_or_default("");
        let result = handle(&state, &client, &json!({ "format": "summary" })).await.unwrap();
        assert!(result["document"].as_str().unwrap().contains("Session Summary"));
    }
}
