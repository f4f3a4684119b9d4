//! The daemon's own MCP method table (spec §4.1/§6), structured the
//! same way as `gasoline_bridge::BridgeDispatcher`'s flat match, but
//! with real business logic behind every arm instead of a forward.

use crate::resources as daemon_resources;
use crate::state::AppState;
use crate::tools as tool_handlers;
use gasoline_protocol::{
    catalogue, resources, Incoming, JsonRpcError, JsonRpcErrorCode, JsonRpcResponse, RequestId,
    ResponseId,
};
use serde_json::{json, Value};

pub struct Dispatcher {
    state: AppState,
}

impl Dispatcher {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Handle one raw JSON-RPC message, returning `None` for
    /// notifications.
    pub async fn handle(&self, raw: &str, cwd_header: Option<&str>) -> Option<String> {
        let incoming: Incoming = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => {
                return Some(
                    JsonRpcResponse::error(ResponseId::null(), JsonRpcErrorCode::ParseError.into())
                        .to_value()
                        .to_string(),
                );
            }
        };

        if incoming.is_notification() {
            return None;
        }

        let id = incoming.id.clone().expect("non-notification carries an id");

        Some(match incoming.method.as_str() {
            "initialize" => self.success(id, Self::initialize_result()),
            "ping" => self.success(id, json!({})),
            "tools/list" => self.success(id, json!({ "tools": catalogue() })),
            "prompts/list" => self.success(id, json!({ "prompts": [] })),
            "resources/list" => self.success(id, json!({ "resources": resources::list() })),
            "resources/templates/list" => self.success(id, json!({ "resourceTemplates": [] })),
            "resources/read" => self.handle_resources_read(&incoming.params, id),
            "tools/call" => self.handle_tools_call(&incoming.params, id, cwd_header).await,
            other => self.method_not_found(other, id),
        })
    }

    fn success(&self, id: RequestId, result: Value) -> String {
        JsonRpcResponse::success(id, result).to_value().to_string()
    }

    fn method_not_found(&self, method: &str, id: RequestId) -> String {
        let mut error: JsonRpcError = JsonRpcErrorCode::MethodNotFound.into();
        error.data = Some(json!({ "method": method }));
        JsonRpcResponse::error(ResponseId::from_request(id), error).to_value().to_string()
    }

    fn handle_resources_read(&self, params: &Option<Value>, id: RequestId) -> String {
        let uri = params.as_ref().and_then(|p| p.get("uri")).and_then(Value::as_str);
        match uri {
            Some(uri) => match daemon_resources::read_or_err(uri) {
                Ok(value) => self.success(id, value),
                Err(err) => JsonRpcResponse::error(ResponseId::from_request(id), JsonRpcError::from(&err))
                    .to_value()
                    .to_string(),
            },
            None => {
                let mut error: JsonRpcError = JsonRpcErrorCode::InvalidParams.into();
                error.data = Some(json!({ "param": "uri" }));
                JsonRpcResponse::error(ResponseId::from_request(id), error).to_value().to_string()
            }
        }
    }

    async fn handle_tools_call(&self, params: &Option<Value>, id: RequestId, cwd_header: Option<&str>) -> String {
        let empty = Value::Object(serde_json::Map::new());
        let params = params.as_ref().unwrap_or(&empty);
        let name = params.get("name").and_then(Value::as_str);
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let Some(name) = name else {
            let mut error: JsonRpcError = JsonRpcErrorCode::InvalidParams.into();
            error.data = Some(json!({ "param": "name" }));
            return JsonRpcResponse::error(ResponseId::from_request(id), error).to_value().to_string();
        };

        let client = self.state.resolve_client(cwd_header);
        let result = tool_handlers::dispatch(&self.state, &client, name, &arguments).await;
        self.success(id, result)
    }

    fn initialize_result() -> Value {
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
            "serverInfo": { "name": "gasoline", "version": env!("CARGO_PKG_VERSION") },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn dispatcher() -> (Dispatcher, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        (Dispatcher::new(state), dir)
    }

    #[tokio::test]
    async fn ping_is_answered_locally() {
        let (dispatcher, _dir) = dispatcher();
        let response = dispatcher.handle(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, None).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["result"], json!({}));
    }

    #[tokio::test]
    async fn tools_list_returns_five_tools() {
        let (dispatcher, _dir) = dispatcher();
        let response = dispatcher.handle(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, None).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["result"]["tools"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn notification_produces_no_response() {
        let (dispatcher, _dir) = dispatcher();
        let response = dispatcher.handle(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, None).await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn malformed_json_yields_parse_error_with_null_id() {
        let (dispatcher, _dir) = dispatcher();
        let response = dispatcher.handle("not json", None).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn tools_call_dispatches_to_a_real_handler() {
        let (dispatcher, _dir) = dispatcher();
        let raw = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"observe","arguments":{"what":"console"}}}"#;
        let response = dispatcher.handle(raw, Some("/home/user/project")).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["result"]["isError"], false);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (dispatcher, _dir) = dispatcher();
        let response = dispatcher.handle(r#"{"jsonrpc":"2.0","id":4,"method":"bogus"}"#, None).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn resources_read_serves_the_capabilities_document() {
        let (dispatcher, _dir) = dispatcher();
        let raw = r#"{"jsonrpc":"2.0","id":5,"method":"resources/read","params":{"uri":"gasoline://capabilities"}}"#;
        let response = dispatcher.handle(raw, None).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert!(value["result"]["contents"][0]["text"].as_str().unwrap().contains("tools"));
    }
}
