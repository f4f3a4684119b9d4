//! The five-tool catalogue's handler implementations, dispatched from
//! `tools/call` by name (spec §4.1).

pub mod analyze;
pub mod common;
pub mod configure;
pub mod generate;
pub mod interact;
pub mod observe;

use crate::state::AppState;
use gasoline_clients::Client;
use gasoline_protocol::tool_error::ToolError;
use serde_json::{json, Value};

/// Route a `tools/call` request to the matching handler and shape the
/// result the way [`ToolError::into_tool_result`] shapes failures:
/// always a successful JSON-RPC payload, `isError` carrying whether the
/// tool itself failed.
pub async fn dispatch(state: &AppState, client: &Client, tool_name: &str, arguments: &Value) -> Value {
    let result = match tool_name {
        "observe" => observe::handle(state, client, arguments).await,
        "analyze" => analyze::handle(state, arguments).await,
        "generate" => generate::handle(state, client, arguments).await,
        "configure" => configure::handle(state, arguments).await,
        "interact" => interact::handle(state, arguments).await,
        other => Err(gasoline_core::GasolineError::InvalidParameterValue {
            name: "name".into(),
            reason: format!("unknown tool '{other}'"),
        }),
    };

    match result {
        Ok(value) => success_result(&value),
        Err(err) => ToolError::from(&err).into_tool_result(),
    }
}

fn success_result(value: &Value) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": serde_json::to_string(value).unwrap_or_default(),
        }],
        "isError": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn unknown_tool_name_comes_back_as_an_is_error_payload() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let client = state.clients.get_or_default("");
        let result = dispatch(&state, &client, "bogus", &json!({})).await;
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn known_tool_success_is_wrapped_with_is_error_false() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        let client = state.clients.get_or_default("");
        let result = dispatch(&state, &client, "observe", &json!({"what": "console"})).await;
        assert_eq!(result["isError"], false);
    }
}
