//! Parameter extraction helpers shared by every tool handler.
//!
//! Every tool's `arguments` object is untyped JSON (spec §4.1); these
//! helpers centralize the "missing" vs "wrong type" distinction so
//! each handler doesn't special-case it in its own dispatch match.

use gasoline_core::GasolineError;
use serde_json::Value;

pub fn required_str(params: &Value, name: &str) -> Result<String, GasolineError> {
    match params.get(name).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        Some(_) => Err(GasolineError::MissingParameter { name: name.to_string() }),
        None => Err(GasolineError::MissingParameter { name: name.to_string() }),
    }
}

pub fn optional_str(params: &Value, name: &str) -> Option<String> {
    params.get(name).and_then(Value::as_str).map(str::to_string)
}

pub fn optional_u64(params: &Value, name: &str) -> Option<u64> {
    params.get(name).and_then(Value::as_u64)
}

pub fn optional_usize(params: &Value, name: &str) -> Option<usize> {
    params.get(name).and_then(Value::as_u64).map(|n| n as usize)
}

pub fn optional_str_list(params: &Value, name: &str) -> Option<Vec<String>> {
    params.get(name).and_then(Value::as_array).map(|items| {
        items.iter().filter_map(Value::as_str).map(str::to_string).collect()
    })
}

/// `observe`/`generate`'s `checkpoint` argument, used as a
/// `gasoline_checkpoint::CheckpointQuery`.
pub fn checkpoint_query(params: &Value) -> gasoline_checkpoint::CheckpointQuery {
    gasoline_checkpoint::CheckpointQuery { checkpoint: optional_str(params, "checkpoint") }
}

/// `observe`'s `severity` argument: `"errors_only"` maps to
/// `Severity::ErrorsOnly`, everything else (including absence) to
/// `Severity::All`.
pub fn severity_filter(params: &Value) -> gasoline_checkpoint::Severity {
    match optional_str(params, "severity").as_deref() {
        Some("errors_only") => gasoline_checkpoint::Severity::ErrorsOnly,
        _ => gasoline_checkpoint::Severity::All,
    }
}

/// Cap a vec to the caller's requested `limit` (most recent entries
/// kept), falling back to `default_limit` when absent.
pub fn apply_limit<T>(mut items: Vec<T>, limit: Option<usize>, default_limit: usize) -> Vec<T> {
    let cap = limit.unwrap_or(default_limit).max(1);
    if items.len() > cap {
        let drop = items.len() - cap;
        items.drain(..drop);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_str_rejects_missing_and_empty() {
        let params = json!({ "what": "" });
        assert!(required_str(&params, "what").is_err());
        assert!(required_str(&json!({}), "what").is_err());
        assert_eq!(required_str(&json!({"what": "console"}), "what").unwrap(), "console");
    }

    #[test]
    fn apply_limit_keeps_the_most_recent_entries() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(apply_limit(items, Some(2), 10), vec![4, 5]);
    }
}
