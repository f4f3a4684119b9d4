//! `VerificationSession`: a baseline capture plus the state machine
//! that gates `watch`/`compare` (spec §4.5).

use crate::state::VerificationState;
use chrono::{DateTime, Utc};
use gasoline_capture::CapturePipeline;
use gasoline_core::fingerprint::verify_fingerprint;
use gasoline_core::ring_buffer::BufferCursor;
use rand::Rng;
use std::collections::HashSet;

/// A point-in-time capture of console errors/warnings, network
/// errors and the current performance sample.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    pub console_errors: Vec<String>,
    pub console_warnings: Vec<String>,
    pub network_errors: Vec<String>,
    pub load_time_ms: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct VerificationSession {
    pub id: String,
    pub label: Option<String>,
    pub url_filter: Option<String>,
    pub state: VerificationState,
    pub baseline: Baseline,
    pub created_at: DateTime<Utc>,
}

/// TTL for verification sessions (configurable per spec §4.5; this is
/// the default used when the caller doesn't override it).
pub const DEFAULT_TTL_SECS: i64 = 30 * 60;

/// Session ids are `verify-` prefixed, per spec §4.5.
#[must_use]
pub fn new_session_id() -> String {
    let suffix: u64 = rand::rng().random();
    format!("verify-{suffix:016x}")
}

impl VerificationSession {
    #[must_use]
    pub fn start(pipeline: &CapturePipeline, label: Option<String>, url_filter: Option<String>) -> Self {
        Self {
            id: new_session_id(),
            label,
            url_filter: url_filter.clone(),
            state: VerificationState::BaselineCaptured,
            baseline: capture_baseline(pipeline, url_filter.as_deref()),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, ttl_secs: i64) -> bool {
        (Utc::now() - self.created_at).num_seconds() > ttl_secs
    }
}

/// Capture console errors/warnings (deduped by `verify_fingerprint`),
/// network errors, and the current performance load time.
#[must_use]
pub fn capture_baseline(pipeline: &CapturePipeline, url_filter: Option<&str>) -> Baseline {
    let (logs, _, _) = pipeline.logs_since(BufferCursor::zero());
    let mut console_errors = Vec::new();
    let mut console_warnings = Vec::new();
    let mut seen = HashSet::new();
    for entry in &logs {
        let Some(message) = entry.message() else { continue };
        if entry.is_error() {
            if seen.insert(verify_fingerprint(message)) {
                console_errors.push(message.to_string());
            }
        } else if entry.is_warning() && seen.insert(format!("w:{}", verify_fingerprint(message))) {
            console_warnings.push(message.to_string());
        }
    }

    let (bodies, _, _) = pipeline.network_since(BufferCursor::zero());
    let mut network_errors = Vec::new();
    let mut seen_paths = HashSet::new();
    for body in &bodies {
        if let Some(filter) = url_filter {
            if !body.url.contains(filter) {
                continue;
            }
        }
        if body.is_failure() && seen_paths.insert(body.path().to_string()) {
            network_errors.push(format!("{} {}", body.path(), body.status));
        }
    }

    let (current, _) = pipeline.latest_performance_pair();
    let load_time_ms = current.map(|p| p.timing.load_ms);

    Baseline { console_errors, console_warnings, network_errors, load_time_ms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_verify_prefixed_and_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(a.starts_with("verify-"));
        assert!(b.starts_with("verify-"));
        assert_ne!(a, b);
    }
}
