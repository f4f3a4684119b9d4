//! JSON-RPC 2.0 envelope types.
//!
//! Deliberately narrower than a general-purpose JSON-RPC library:
//! this daemon speaks a closed method set (§6) over two transports
//! (stdio, HTTP POST `/mcp`), so there is no batch support and no
//! pluggable transport abstraction — see DESIGN.md for why that
//! diverges from the teacher's fuller `JsonRpcMessage`/`JsonRpcBatch`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

/// The `"2.0"` literal, serialized/deserialized as a plain string but
/// validated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom(format!(
                "invalid JSON-RPC version: expected '{JSONRPC_VERSION}', got '{version}'"
            )))
        }
    }
}

/// Request identifier: string or number, per JSON-RPC 2.0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// An incoming envelope as parsed off the wire, before we know
/// whether it is a request or a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct Incoming {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl Incoming {
    /// A message is a notification if it has no `id`, or its method
    /// starts with `notifications/` (some clients send a `null` or
    /// absent id but still populate a notification-shaped method).
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none() || self.method.starts_with("notifications/")
    }
}

/// Response ID: `None` only for parse errors, per JSON-RPC 2.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(pub Option<RequestId>);

impl ResponseId {
    #[must_use]
    pub const fn from_request(id: RequestId) -> Self {
        Self(Some(id))
    }

    #[must_use]
    pub const fn null() -> Self {
        Self(None)
    }
}

/// Mutually-exclusive result/error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcPayload {
    Success { result: Value },
    Error { error: JsonRpcError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: JsonRpcVersion,
    #[serde(flatten)]
    pub payload: JsonRpcPayload,
    pub id: ResponseId,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcPayload::Success { result },
            id: ResponseId::from_request(id),
        }
    }

    #[must_use]
    pub fn error(id: ResponseId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcPayload::Error { error },
            id,
        }
    }

    /// Serialize with framing rules applied by the caller (this just
    /// produces the JSON body; stdio/HTTP framing is layered on top in
    /// `gasoline-bridge`/`gasoline-server`).
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("JsonRpcResponse always serializes")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Standard JSON-RPC error codes used by this daemon (spec §4.1/§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl JsonRpcErrorCode {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

impl From<JsonRpcErrorCode> for JsonRpcError {
    fn from(code: JsonRpcErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: None,
        }
    }
}

/// Maps an internal failure onto a JSON-RPC error, keeping the tool-facing
/// `code`/`hint` in `data` so a client can act on it without string-matching
/// `message`. Parameter problems become `InvalidParams`; everything else is
/// `InternalError` (there is no internal condition that maps to
/// `MethodNotFound`/`ParseError`/`InvalidRequest` — those are caught earlier
/// in dispatch, before a `GasolineError` exists).
impl From<&gasoline_core::GasolineError> for JsonRpcError {
    fn from(err: &gasoline_core::GasolineError) -> Self {
        use gasoline_core::GasolineError::{InvalidParameterValue, MissingParameter};
        let rpc_code = match err {
            MissingParameter { .. } | InvalidParameterValue { .. } => JsonRpcErrorCode::InvalidParams,
            _ => JsonRpcErrorCode::InternalError,
        };
        Self {
            code: rpc_code.code(),
            message: err.to_string(),
            data: Some(serde_json::json!({
                "code": err.code(),
                "hint": err.hint(),
                "param": err.param(),
            })),
        }
    }
}

impl From<gasoline_core::GasolineError> for JsonRpcError {
    fn from(err: gasoline_core::GasolineError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_has_no_id_or_notifications_prefixed_method() {
        let n = Incoming {
            jsonrpc: Some("2.0".into()),
            method: "notifications/cancelled".into(),
            params: None,
            id: Some(RequestId::Number(1)),
        };
        assert!(n.is_notification());

        let r = Incoming {
            jsonrpc: Some("2.0".into()),
            method: "ping".into(),
            params: None,
            id: None,
        };
        assert!(r.is_notification());

        let req = Incoming {
            jsonrpc: Some("2.0".into()),
            method: "ping".into(),
            params: None,
            id: Some(RequestId::Number(1)),
        };
        assert!(!req.is_notification());
    }

    #[test]
    fn response_is_result_xor_error() {
        let ok = JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"a": 1}));
        let value = ok.to_value();
        assert!(value.get("result").is_some());
        assert!(value.get("error").is_none());

        let err = JsonRpcResponse::error(
            ResponseId::null(),
            JsonRpcErrorCode::ParseError.into(),
        );
        let value = err.to_value();
        assert!(value.get("error").is_some());
        assert!(value.get("result").is_none());
        assert_eq!(value.get("id"), Some(&Value::Null));
    }
}
