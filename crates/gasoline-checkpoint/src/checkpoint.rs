//! The `Checkpoint` entity: a snapshot of buffer positions, known
//! endpoints and the alert-delivery watermark at creation time.

use chrono::{DateTime, Utc};
use gasoline_capture::BufferPositions;
use std::collections::HashMap;

/// Previously observed status + baseline duration for one network
/// endpoint path, used to classify new failures and latency
/// regressions on the next diff (spec §4.4).
#[derive(Debug, Clone, Copy)]
pub struct EndpointInfo {
    pub status: u16,
    pub baseline_duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Checkpoint {
    /// `None` for the anonymous auto checkpoint.
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub positions: BufferPositions,
    pub known_endpoints: HashMap<String, EndpointInfo>,
    /// Alert-delivery counter value at creation; alerts delivered
    /// before this watermark are skipped on the next poll.
    pub alert_watermark: u64,
}

impl Checkpoint {
    #[must_use]
    pub fn named(name: impl Into<String>, positions: BufferPositions, alert_watermark: u64) -> Self {
        Self {
            name: Some(name.into()),
            created_at: Utc::now(),
            positions,
            known_endpoints: HashMap::new(),
            alert_watermark,
        }
    }

    #[must_use]
    pub fn auto(positions: BufferPositions, alert_watermark: u64) -> Self {
        Self {
            name: None,
            created_at: Utc::now(),
            positions,
            known_endpoints: HashMap::new(),
            alert_watermark,
        }
    }

    #[must_use]
    pub fn beginning() -> Self {
        Self {
            name: None,
            created_at: DateTime::<Utc>::MIN_UTC,
            positions: BufferPositions::default(),
            known_endpoints: HashMap::new(),
            alert_watermark: 0,
        }
    }
}

/// Name constraints: non-empty, at most 50 characters (spec §4.4).
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= 50
}
