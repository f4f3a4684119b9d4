//! The `TemporalEvent` entity and its recording input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Error,
    Regression,
    Resolution,
    BaselineShift,
    Deploy,
    Fix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    System,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Resolved,
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub target_id: String,
    pub relationship: String,
    pub confidence: f64,
}

/// A recorded event. `timestamp` is kept as the raw RFC3339 string it
/// was stored with rather than a typed `DateTime`, so that an entry
/// with an unparseable timestamp can still round-trip through the
/// JSONL file instead of failing deserialization outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalEvent {
    pub id: String,
    pub event_type: EventType,
    pub timestamp: String,
    pub description: String,
    pub source: String,
    pub origin: Origin,
    #[serde(default)]
    pub agent: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub links: Vec<Link>,
    pub occurrence_count: u32,
}

impl TemporalEvent {
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(&self.timestamp).ok().map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

/// Caller-supplied fields for `TemporalGraph::record`; id, timestamp,
/// status, and occurrence count are filled in by the graph.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: EventType,
    pub description: String,
    pub source: String,
    pub origin: Origin,
    pub agent: Option<String>,
    pub links: Vec<Link>,
}
