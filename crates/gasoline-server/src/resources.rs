//! `resources/read` handling for the daemon's own URI space (spec
//! §4.1: capabilities document and playbook documents).

use gasoline_core::GasolineError;
use gasoline_protocol::resources::{self, CAPABILITIES_URI};
use serde_json::{json, Value};

/// Render the body for one `resources/read` URI, or `None` if the URI
/// is not recognized (the caller maps that to `InvalidParameterValue`).
#[must_use]
pub fn read(uri: &str) -> Option<Value> {
    if uri == CAPABILITIES_URI {
        return Some(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": resources::capabilities_document().to_string(),
            }],
        }));
    }

    let (topic, variant) = resources::parse_playbook_uri(uri)?;
    let body = resources::playbook_document(topic, variant)?;
    Some(json!({
        "contents": [{
            "uri": uri,
            "mimeType": "text/markdown",
            "text": body,
        }],
    }))
}

pub fn read_or_err(uri: &str) -> Result<Value, GasolineError> {
    read(uri).ok_or_else(|| GasolineError::InvalidParameterValue {
        name: "uri".into(),
        reason: format!("no such resource '{uri}'"),
    })
}
