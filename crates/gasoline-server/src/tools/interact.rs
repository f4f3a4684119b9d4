//! `interact`: drive the verification and session-diff state machines
//! (spec §4.1/§4.5).

use super::common::{optional_str, required_str};
use crate::state::AppState;
use gasoline_core::GasolineError;
use serde_json::{json, Value};

pub async fn handle(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let action = required_str(params, "action")?;
    match action.as_str() {
        "verify_start" => verify_start(state, params),
        "verify_watch" => verify_watch(state, params),
        "verify_compare" => super::analyze::verify_compare(state, params),
        "verify_cancel" => verify_cancel(state, params),
        "session_diff_create" => session_diff_create(state, params),
        "session_diff_compare" => session_diff_compare(state, params),
        other => Err(GasolineError::InvalidParameterValue {
            name: "action".into(),
            reason: format!("unknown interaction '{other}'"),
        }),
    }
}

fn verify_start(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let label = optional_str(params, "label");
    let url_filter = optional_str(params, "url_filter");
    let id = state.verification.start(&state.pipeline, label, url_filter)?;
    Ok(json!({ "session_id": id, "state": "baseline_captured" }))
}

fn verify_watch(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let session_id = required_str(params, "session_id")?;
    state.verification.watch(&session_id)?;
    Ok(json!({ "session_id": session_id, "state": "watching" }))
}

fn verify_cancel(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let session_id = required_str(params, "session_id")?;
    state.verification.cancel(&session_id)?;
    Ok(json!({ "session_id": session_id, "state": "cancelled" }))
}

fn session_diff_create(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let name = required_str(params, "name")?;
    state.snapshots.create(&name, &state.pipeline)?;
    Ok(json!({ "name": name, "created": true }))
}

fn session_diff_compare(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let name = required_str(params, "name")?;
    super::analyze::session_diff_named(state, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn verify_lifecycle_start_watch_compare() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let started = handle(&state, &json!({ "action": "verify_start" })).await.unwrap();
        let id = started["session_id"].as_str().unwrap().to_string();

        handle(&state, &json!({ "action": "verify_watch", "session_id": id })).await.unwrap();
        let compared = handle(&state, &json!({ "action": "verify_compare", "session_id": id })).await.unwrap();
        assert_eq!(compared["verdict"], "NoIssuesDetected");
    }

    #[tokio::test]
    async fn verify_compare_before_watch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let started = handle(&state, &json!({ "action": "verify_start" })).await.unwrap();
        let id = started["session_id"].as_str().unwrap().to_string();
        let err = handle(&state, &json!({ "action": "verify_compare", "session_id": id })).await.unwrap_err();
        assert_eq!(err.code(), "invalid_parameter_value");
    }
}
