//! `CheckpointManager`: named checkpoints (bounded, FIFO eviction)
//! plus the single anonymous auto checkpoint, and the priority-order
//! resolution spec §4.4 requires.

use crate::checkpoint::{is_valid_name, Checkpoint, EndpointInfo};
use chrono::{DateTime, Utc};
use gasoline_capture::{BufferPositions, CapturePipeline};
use gasoline_core::GasolineError;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

pub const MAX_NAMED_CHECKPOINTS: usize = 20;

/// Parameters accepted by `GetChangesSince` (spec §4.4): an optional
/// checkpoint reference, resolved through the documented priority
/// order.
#[derive(Debug, Clone, Default)]
pub struct CheckpointQuery {
    /// Empty/absent -> auto-checkpoint.
    pub checkpoint: Option<String>,
}

struct Inner {
    /// Insertion order for FIFO eviction; `key` is the namespaced or
    /// bare name under which the checkpoint is stored.
    order: VecDeque<String>,
    named: HashMap<String, Checkpoint>,
    auto: Option<Checkpoint>,
}

pub struct CheckpointManager {
    inner: Mutex<Inner>,
}

impl Default for CheckpointManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                named: HashMap::new(),
                auto: None,
            }),
        }
    }

    fn namespaced(name: &str, client_id: Option<&str>) -> String {
        match client_id {
            Some(id) if !id.is_empty() => format!("{id}:{name}"),
            _ => name.to_string(),
        }
    }

    /// `CreateCheckpoint(name, clientID)` (spec §4.4).
    pub fn create(
        &self,
        name: &str,
        client_id: Option<&str>,
        positions: BufferPositions,
        alert_watermark: u64,
    ) -> Result<(), GasolineError> {
        if !is_valid_name(name) {
            return Err(GasolineError::InvalidParameterValue {
                name: "name".into(),
                reason: "checkpoint name must be 1-50 characters".into(),
            });
        }
        let key = Self::namespaced(name, client_id);
        let mut inner = self.inner.lock();
        if !inner.named.contains_key(&key) {
            if inner.order.len() >= MAX_NAMED_CHECKPOINTS {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.named.remove(&oldest);
                }
            }
            inner.order.push_back(key.clone());
        }
        inner
            .named
            .insert(key, Checkpoint::named(name, positions, alert_watermark));
        Ok(())
    }

    /// Resolve a query into the checkpoint positions to diff against,
    /// its known endpoints, and its alert watermark, following spec
    /// §4.4's priority order: empty -> auto (created lazily on first
    /// use) -> namespaced name -> bare name (legacy) -> RFC3339/Nano
    /// timestamp (via `pipeline.positions_after`) -> beginning.
    pub fn resolve(
        &self,
        query: &CheckpointQuery,
        client_id: Option<&str>,
        pipeline: &CapturePipeline,
        current_alert_counter: u64,
    ) -> ResolvedCheckpoint {
        let mut inner = self.inner.lock();
        match query.checkpoint.as_deref() {
            None | Some("") => {
                let checkpoint = inner
                    .auto
                    .get_or_insert_with(|| Checkpoint::auto(pipeline.positions(), current_alert_counter));
                ResolvedCheckpoint {
                    positions: checkpoint.positions,
                    known_endpoints: checkpoint.known_endpoints.clone(),
                    alert_watermark: checkpoint.alert_watermark,
                    is_auto: true,
                }
            }
            Some(name) => {
                let namespaced = Self::namespaced(name, client_id);
                if let Some(checkpoint) = inner.named.get(&namespaced) {
                    return ResolvedCheckpoint {
                        positions: checkpoint.positions,
                        known_endpoints: checkpoint.known_endpoints.clone(),
                        alert_watermark: checkpoint.alert_watermark,
                        is_auto: false,
                    };
                }
                // Legacy fallback: bare (non-namespaced) name.
                if let Some(checkpoint) = inner.named.get(name) {
                    return ResolvedCheckpoint {
                        positions: checkpoint.positions,
                        known_endpoints: checkpoint.known_endpoints.clone(),
                        alert_watermark: checkpoint.alert_watermark,
                        is_auto: false,
                    };
                }
                if let Ok(ts) = DateTime::parse_from_rfc3339(name) {
                    let positions = pipeline.positions_after(ts.with_timezone(&Utc));
                    return ResolvedCheckpoint {
                        positions,
                        known_endpoints: HashMap::new(),
                        alert_watermark: 0,
                        is_auto: false,
                    };
                }
                ResolvedCheckpoint {
                    positions: BufferPositions::default(),
                    known_endpoints: HashMap::new(),
                    alert_watermark: 0,
                    is_auto: false,
                }
            }
        }
    }

    /// Advance the auto checkpoint to `now`, merge in newly-known
    /// endpoints and stamp the new alert watermark -- called after
    /// every anonymous diff query (spec §4.4).
    pub fn advance_auto(
        &self,
        positions: BufferPositions,
        known_endpoints: HashMap<String, EndpointInfo>,
        alert_watermark: u64,
    ) {
        let mut inner = self.inner.lock();
        let checkpoint = inner.auto.get_or_insert_with(|| Checkpoint::auto(positions, alert_watermark));
        checkpoint.positions = positions;
        checkpoint.known_endpoints.extend(known_endpoints);
        checkpoint.alert_watermark = alert_watermark;
        checkpoint.created_at = Utc::now();
    }

    #[must_use]
    pub fn named_count(&self) -> usize {
        self.inner.lock().named.len()
    }
}

/// The result of resolving a checkpoint query: positions to diff
/// against plus context for endpoint/alert bookkeeping.
#[derive(Debug, Clone)]
pub struct ResolvedCheckpoint {
    pub positions: BufferPositions,
    pub known_endpoints: HashMap<String, EndpointInfo>,
    pub alert_watermark: u64,
    pub is_auto: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoline_capture::CaptureConfig;

    #[test]
    fn create_rejects_invalid_names() {
        let mgr = CheckpointManager::new();
        let err = mgr.create("", None, BufferPositions::default(), 0).unwrap_err();
        assert_eq!(err.code(), "invalid_parameter_value");
    }

    #[test]
    fn fifo_eviction_drops_oldest_named_checkpoint_past_cap() {
        let mgr = CheckpointManager::new();
        for i in 0..MAX_NAMED_CHECKPOINTS + 1 {
            mgr.create(&format!("cp{i}"), None, BufferPositions::default(), 0).unwrap();
        }
        assert_eq!(mgr.named_count(), MAX_NAMED_CHECKPOINTS);
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        let resolved = mgr.resolve(
            &CheckpointQuery { checkpoint: Some("cp0".into()) },
            None,
            &pipeline,
            0,
        );
        // cp0 was evicted; falls through to "beginning".
        assert_eq!(resolved.positions, BufferPositions::default());
    }

    #[test]
    fn namespaced_lookup_falls_back_to_bare_legacy_name() {
        let mgr = CheckpointManager::new();
        mgr.create("pre", None, BufferPositions { logs: 3, ..Default::default() }, 0).unwrap();
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        let resolved = mgr.resolve(
            &CheckpointQuery { checkpoint: Some("pre".into()) },
            Some("clientX"),
            &pipeline,
            0,
        );
        assert_eq!(resolved.positions.logs, 3);
    }

    #[test]
    fn empty_query_creates_and_reuses_the_auto_checkpoint() {
        let mgr = CheckpointManager::new();
        let pipeline = CapturePipeline::new(CaptureConfig::default());
        let first = mgr.resolve(&CheckpointQuery::default(), None, &pipeline, 0);
        assert!(first.is_auto);
        let second = mgr.resolve(&CheckpointQuery::default(), None, &pipeline, 0);
        assert_eq!(first.positions, second.positions);
    }
}
