//! `analyze`: compare captured state across time (spec §4.1/§4.5/§4.6/§4.10).

use super::common::{apply_limit, optional_str, required_str};
use crate::state::AppState;
use gasoline_core::GasolineError;
use gasoline_temporal::{EventQuery, EventType};
use serde_json::{json, Value};

const DEFAULT_LIMIT: usize = 100;

pub async fn handle(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let what = required_str(params, "what")?;
    match what.as_str() {
        "verify_compare" => verify_compare(state, params),
        "session_diff" => {
            let name = required_str(params, "snapshot_name")?;
            session_diff_named(state, &name)
        }
        "regressions" => Ok(regressions(state, params)),
        "temporal_events" => Ok(temporal_events(state, params)),
        other => Err(GasolineError::InvalidParameterValue {
            name: "what".into(),
            reason: format!("unknown analysis '{other}'"),
        }),
    }
}

pub(crate) fn verify_compare(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let session_id = required_str(params, "session_id")?;
    let result = state.verification.with_session(&session_id, |session| {
        gasoline_verify::compare_verdict(&session.baseline, &state.pipeline, session.url_filter.as_deref())
    })?;
    state.verification.mark_compared(&session_id)?;

    Ok(json!({
        "verdict": format!("{:?}", result.verdict),
        "changes": result.changes.iter().map(|c| json!({
            "message": c.message, "kind": format!("{:?}", c.kind),
        })).collect::<Vec<_>>(),
        "new_network_errors": result.new_network_errors,
        "performance_diff": result.performance_diff,
    }))
}

pub(crate) fn session_diff_named(state: &AppState, name: &str) -> Result<Value, GasolineError> {
    let diff = state.snapshots.compare(name, None, &state.pipeline)?;
    Ok(json!({
        "verdict": format!("{:?}", diff.verdict()),
        "new_errors": diff.new_errors,
        "resolved_errors": diff.resolved_errors,
        "network_status_changes": diff.network_status_changes,
        "load_time_regressed": diff.load_time_regressed,
        "load_time_improved": diff.load_time_improved,
    }))
}

fn regressions(state: &AppState, params: &Value) -> Value {
    let limit = super::common::optional_usize(params, "limit");
    let regressions: Vec<_> = state
        .alert_log
        .since(0)
        .into_iter()
        .filter(|a| matches!(a.category, gasoline_alerts::Category::Regression))
        .collect();
    let regressions = apply_limit(regressions, limit, DEFAULT_LIMIT);
    json!({
        "regressions": regressions.iter().map(|a| json!({
            "title": a.title, "detail": a.detail, "timestamp": a.timestamp, "source": a.source,
        })).collect::<Vec<_>>(),
        "pending_count": state.regression.pending_count(),
    })
}

fn temporal_events(state: &AppState, params: &Value) -> Value {
    let event_type = optional_str(params, "event_type").and_then(|s| parse_event_type(&s));
    let since_window = optional_str(params, "since");
    let result = state.temporal.query(&EventQuery { event_type, since_window, contains: None, links_to: None });
    json!({
        "events": result.events,
        "total": result.total,
        "window": result.window,
        "summary": result.summary,
    })
}

fn parse_event_type(s: &str) -> Option<EventType> {
    match s {
        "error" => Some(EventType::Error),
        "regression" => Some(EventType::Regression),
        "resolution" => Some(EventType::Resolution),
        "baseline_shift" => Some(EventType::BaselineShift),
        "deploy" => Some(EventType::Deploy),
        "fix" => Some(EventType::Fix),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn verify_compare_requires_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let err = handle(&state, &json!({ "what": "verify_compare" })).await.unwrap_err();
        assert_eq!(err.code(), "missing_parameter");
    }

    #[tokio::test]
    async fn temporal_events_defaults_to_a_seven_day_window() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let result = handle(&state, &json!({ "what": "temporal_events" })).await.unwrap();
        assert_eq!(result["window"], "7d");
    }
}
