//! `configure`: adjust the push-notification stream (spec §4.1/§4.7).

use super::common::{optional_str, optional_str_list, optional_u64, required_str};
use crate::state::AppState;
use gasoline_core::GasolineError;
use gasoline_stream::StreamConfig;
use serde_json::{json, Value};

pub async fn handle(state: &AppState, params: &Value) -> Result<Value, GasolineError> {
    let action = required_str(params, "action")?;
    match action.as_str() {
        "stream_enable" => Ok(stream_enable(state, params)),
        "stream_disable" => Ok(stream_disable(state)),
        "stream_status" => Ok(stream_status(state)),
        other => Err(GasolineError::InvalidParameterValue {
            name: "action".into(),
            reason: format!("unknown configuration action '{other}'"),
        }),
    }
}

fn stream_enable(state: &AppState, params: &Value) -> Value {
    let defaults = StreamConfig::default();
    let config = StreamConfig {
        enabled: true,
        events: optional_str_list(params, "events").unwrap_or(defaults.events),
        throttle_seconds: optional_u64(params, "throttle_seconds").unwrap_or(defaults.throttle_seconds),
        url_filter: optional_str(params, "url_filter"),
        severity_min: optional_str(params, "severity_min").unwrap_or(defaults.severity_min),
    };
    state.stream.configure(config);
    stream_status(state)
}

fn stream_disable(state: &AppState) -> Value {
    state.stream.disable();
    stream_status(state)
}

fn stream_status(state: &AppState) -> Value {
    let status = state.stream.status();
    json!({
        "enabled": status.config.enabled,
        "events": status.config.events,
        "throttle_seconds": status.config.throttle_seconds,
        "severity_min": status.config.severity_min,
        "url_filter": status.config.url_filter,
        "notify_count": status.notify_count,
        "pending_count": status.pending_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn enable_then_disable_round_trips_through_status() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let enabled = handle(&state, &json!({ "action": "stream_enable", "severity_min": "error" })).await.unwrap();
        assert_eq!(enabled["enabled"], true);
        assert_eq!(enabled["severity_min"], "error");

        let disabled = handle(&state, &json!({ "action": "stream_disable" })).await.unwrap();
        assert_eq!(disabled["enabled"], false);
    }
}
