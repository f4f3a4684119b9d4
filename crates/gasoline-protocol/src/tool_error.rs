//! Tool-level error payload.
//!
//! Recoverable tool failures are returned as a *successful* JSON-RPC
//! result whose content carries `isError: true` (spec §4.1/§7) rather
//! than a JSON-RPC error, so the AI client can keep the conversation
//! going instead of treating it as a transport failure.

use gasoline_core::GasolineError;
use serde::Serialize;
use serde_json::Value;

/// Structured error record embedded in a tool's `isError:true`
/// content block.
#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub code: &'static str,
    pub message: String,
    pub hint: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl From<&GasolineError> for ToolError {
    fn from(err: &GasolineError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            hint: err.hint(),
            param: err.param().map(str::to_owned),
        }
    }
}

impl From<GasolineError> for ToolError {
    fn from(err: GasolineError) -> Self {
        Self::from(&err)
    }
}

impl ToolError {
    /// Wrap this error as the `tools/call` result content the
    /// dispatcher returns: a *successful* JSON-RPC payload whose
    /// content says `isError: true`.
    #[must_use]
    pub fn into_tool_result(self) -> Value {
        serde_json::json!({
            "content": [{
                "type": "text",
                "text": serde_json::to_string(&self).unwrap_or_else(|_| self.message.clone()),
            }],
            "isError": true,
            "error": self,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_result_is_a_success_payload_with_is_error_flag() {
        let err = GasolineError::MissingParameter { name: "action".into() };
        let tool_err: ToolError = err.into();
        let value = tool_err.into_tool_result();
        assert_eq!(value["isError"], true);
        assert_eq!(value["error"]["param"], "action");
    }
}
