//! Capture pipeline configuration: buffer capacities, body size caps
//! and the rate-limit window, serde-derived with `Default` so the CLI
//! and tests can both override pieces of it (SPEC_FULL.md §2 ambient
//! configuration note).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 1 MB body cap for logs/network/websocket ingest (spec §4.3).
pub const SMALL_BODY_LIMIT_BYTES: usize = 1024 * 1024;
/// 11 MB body cap for action batches (spec §4.3).
pub const ACTIONS_BODY_LIMIT_BYTES: usize = 11 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub log_capacity: usize,
    pub network_capacity: usize,
    pub websocket_capacity: usize,
    pub actions_capacity: usize,
    pub performance_capacity: usize,
    pub rate_limit_max_requests: u32,
    #[serde(with = "duration_secs")]
    pub rate_limit_window: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            log_capacity: 500,
            network_capacity: 500,
            websocket_capacity: 500,
            actions_capacity: 500,
            performance_capacity: 200,
            rate_limit_max_requests: 120,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
