//! Safe JSON helpers shared by every crate that touches wire payloads.

use serde_json::Value;

/// Parse bytes as JSON, returning [`None`] instead of propagating a
/// raw `serde_json::Error` — every passthrough path in this daemon
/// substitutes a structured error for a parse failure rather than
/// leaking the parser's own error type to callers.
#[must_use]
pub fn parse_safe(bytes: &[u8]) -> Option<Value> {
    serde_json::from_slice(bytes).ok()
}

/// Approximate token count for a JSON payload: byte length divided by
/// four, per the checkpoint/diff engine's token-budget estimate.
#[must_use]
pub fn approx_tokens(value: &Value) -> usize {
    serde_json::to_vec(value).map_or(0, |bytes| bytes.len() / 4)
}

/// Serialize a value, falling back to a minimal JSON-RPC-shaped error
/// object if serialization somehow fails (e.g. a `NaN` float slipped
/// through), so a passthrough path never emits invalid bytes.
#[must_use]
pub fn to_vec_safe(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        serde_json::to_vec(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": { "code": -32603, "message": format!("serialization failed: {e}") }
        }))
        .expect("static fallback payload always serializes")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_safe_rejects_garbage() {
        assert!(parse_safe(b"not json").is_none());
        assert!(parse_safe(b"{\"a\":1}").is_some());
    }

    #[test]
    fn approx_tokens_divides_byte_length_by_four() {
        let v = serde_json::json!({"a": "bbbb"}); // {"a":"bbbb"} = 11 bytes
        let tokens = approx_tokens(&v);
        assert_eq!(tokens, serde_json::to_vec(&v).unwrap().len() / 4);
    }
}
