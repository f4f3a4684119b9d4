//! `resources/list` and `resources/read` surface: the capabilities
//! document and playbook documents.
//!
//! Both must serve at p99 < 100ms in steady state (spec §6), so they
//! are static data built once, not recomputed per request.

use serde_json::{json, Value};

pub const CAPABILITIES_URI: &str = "gasoline://capabilities";

/// Playbook topics, sourced from spec.md's own vocabulary since
/// `original_source/` carried no recoverable files to crib topic
/// names from (see SPEC_FULL.md §4.1 supplemental note / DESIGN.md).
pub const PLAYBOOK_TOPICS: &[&str] = &[
    "network-errors",
    "console-errors",
    "websocket-issues",
    "performance-regression",
];

pub const PLAYBOOK_VARIANTS: &[&str] = &["summary", "detailed"];

#[derive(Debug, Clone, serde::Serialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
}

/// All resources advertised by `resources/list`.
#[must_use]
pub fn list() -> Vec<ResourceDescriptor> {
    let mut resources = vec![ResourceDescriptor {
        uri: CAPABILITIES_URI.to_string(),
        name: "capabilities".to_string(),
        mime_type: "application/json",
    }];
    for topic in PLAYBOOK_TOPICS {
        for variant in PLAYBOOK_VARIANTS {
            resources.push(ResourceDescriptor {
                uri: format!("gasoline://playbook/{topic}/{variant}"),
                name: format!("playbook:{topic}:{variant}"),
                mime_type: "text/markdown",
            });
        }
    }
    resources
}

/// Parse a `gasoline://playbook/{topic}/{variant}` URI.
#[must_use]
pub fn parse_playbook_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("gasoline://playbook/")?;
    let mut parts = rest.splitn(2, '/');
    let topic = parts.next()?;
    let variant = parts.next()?;
    if PLAYBOOK_TOPICS.contains(&topic) && PLAYBOOK_VARIANTS.contains(&variant) {
        Some((topic, variant))
    } else {
        None
    }
}

/// Render the capabilities document: the tool catalogue plus the
/// fixed method/transport surface, for AI clients that read resources
/// instead of (or alongside) `tools/list`.
#[must_use]
pub fn capabilities_document() -> Value {
    let tool_names: Vec<_> = crate::tools::catalogue().into_iter().map(|t| t.name).collect();
    json!({
        "tools": tool_names,
        "transports": ["stdio", "http"],
        "streams": ["logs", "network", "websocket", "actions"],
        "push": { "notifications": "notifications/message" },
    })
}

/// Render a playbook document body (markdown). Content is a short,
/// fixed guide per topic/variant; there is no dynamic state involved.
#[must_use]
pub fn playbook_document(topic: &str, variant: &str) -> Option<String> {
    if !PLAYBOOK_TOPICS.contains(&topic) || !PLAYBOOK_VARIANTS.contains(&variant) {
        return None;
    }
    let body = match variant {
        "summary" => format!("# {topic}\n\nUse `observe` with `what=\"diff\"` to see recent {topic} since your last checkpoint."),
        _ => format!(
            "# {topic} (detailed)\n\n1. Create a checkpoint before reproducing.\n2. Reproduce the issue.\n3. Call `observe` with `what=\"diff\"` and inspect the {topic} block.\n4. Use `interact` with `action=\"verify_start\"` to confirm a fix."
        ),
    };
    Some(body)
}
