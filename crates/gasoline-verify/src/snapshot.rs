//! Named session-diff snapshots (spec §4.5): a separate, user-named
//! store from verification sessions, max 10 entries with LRU
//! eviction, reserved name `current` for live comparisons.

use chrono::{DateTime, Utc};
use gasoline_capture::CapturePipeline;
use gasoline_core::ring_buffer::BufferCursor;
use gasoline_core::GasolineError;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

pub const MAX_SNAPSHOTS: usize = 10;
pub const CAP_ERRORS: usize = 50;
pub const CAP_REQUESTS: usize = 100;
pub const CAP_WS: usize = 20;

/// Reserved name: compares a named snapshot against live state
/// without persisting the second side.
pub const CURRENT: &str = "current";

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub name: String,
    pub captured_at: DateTime<Utc>,
    pub console_errors: Vec<String>,
    pub console_warnings: Vec<String>,
    pub network_requests: Vec<(String, u16)>,
    pub websocket_connections: Vec<String>,
    pub load_time_ms: Option<f64>,
}

#[must_use]
pub fn capture(name: &str, pipeline: &CapturePipeline) -> Snapshot {
    let (logs, _, _) = pipeline.logs_since(BufferCursor::zero());
    let console_errors: Vec<String> = logs
        .iter()
        .filter(|e| e.is_error())
        .filter_map(|e| e.message().map(str::to_string))
        .take(CAP_ERRORS)
        .collect();
    let console_warnings: Vec<String> = logs
        .iter()
        .filter(|e| e.is_warning())
        .filter_map(|e| e.message().map(str::to_string))
        .take(CAP_ERRORS)
        .collect();

    let (bodies, _, _) = pipeline.network_since(BufferCursor::zero());
    let network_requests: Vec<(String, u16)> = bodies
        .iter()
        .rev()
        .take(CAP_REQUESTS)
        .map(|b| (b.path().to_string(), b.status))
        .collect();

    let (ws, _, _) = pipeline.websocket_since(BufferCursor::zero());
    let websocket_connections: Vec<String> = ws.iter().map(|e| e.id.clone()).take(CAP_WS).collect();

    let (current, _) = pipeline.latest_performance_pair();
    let load_time_ms = current.map(|p| p.timing.load_ms);

    Snapshot {
        name: name.to_string(),
        captured_at: Utc::now(),
        console_errors,
        console_warnings,
        network_requests,
        websocket_connections,
        load_time_ms,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDiffVerdict {
    Improved,
    Regressed,
    Mixed,
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct SessionDiff {
    pub new_errors: Vec<String>,
    pub resolved_errors: Vec<String>,
    pub network_status_changes: Vec<(String, u16, u16)>,
    pub load_time_regressed: bool,
    pub load_time_improved: bool,
}

impl SessionDiff {
    #[must_use]
    pub fn verdict(&self) -> SessionDiffVerdict {
        let improved = !self.resolved_errors.is_empty() || self.load_time_improved;
        let regressed = !self.new_errors.is_empty() || self.load_time_regressed;
        match (improved, regressed) {
            (true, true) => SessionDiffVerdict::Mixed,
            (true, false) => SessionDiffVerdict::Improved,
            (false, true) => SessionDiffVerdict::Regressed,
            (false, false) => SessionDiffVerdict::Unchanged,
        }
    }
}

/// Diff `before` against `after`: new/resolved console errors,
/// network status transitions, and a >25% load-time regression
/// threshold (spec §4.5).
#[must_use]
pub fn diff(before: &Snapshot, after: &Snapshot) -> SessionDiff {
    use std::collections::HashSet;
    let before_errors: HashSet<&str> = before.console_errors.iter().map(String::as_str).collect();
    let after_errors: HashSet<&str> = after.console_errors.iter().map(String::as_str).collect();

    let new_errors = after.console_errors.iter().filter(|e| !before_errors.contains(e.as_str())).cloned().collect();
    let resolved_errors = before.console_errors.iter().filter(|e| !after_errors.contains(e.as_str())).cloned().collect();

    let before_status: HashMap<&str, u16> = before.network_requests.iter().map(|(p, s)| (p.as_str(), *s)).collect();
    let mut network_status_changes = Vec::new();
    for (path, status) in &after.network_requests {
        if let Some(&prev) = before_status.get(path.as_str()) {
            if prev != *status {
                network_status_changes.push((path.clone(), prev, *status));
            }
        }
    }

    let (load_time_regressed, load_time_improved) = match (before.load_time_ms, after.load_time_ms) {
        (Some(b), Some(a)) if b > 0.0 => {
            let delta = (a - b) / b;
            (delta > 0.25, delta < -0.25)
        }
        _ => (false, false),
    };

    SessionDiff { new_errors, resolved_errors, network_status_changes, load_time_regressed, load_time_improved }
}

pub struct SnapshotStore {
    inner: Mutex<Inner>,
}

struct Inner {
    order: VecDeque<String>,
    snapshots: HashMap<String, Snapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { order: VecDeque::new(), snapshots: HashMap::new() }) }
    }

    pub fn create(&self, name: &str, pipeline: &CapturePipeline) -> Result<(), GasolineError> {
        if name == CURRENT {
            return Err(GasolineError::InvalidParameterValue {
                name: "name".into(),
                reason: format!("'{CURRENT}' is reserved for live comparisons"),
            });
        }
        if name.is_empty() {
            return Err(GasolineError::MissingParameter { name: "name".into() });
        }
        let snapshot = capture(name, pipeline);
        let mut inner = self.inner.lock();
        if inner.snapshots.contains_key(name) {
            inner.order.retain(|n| n != name);
        } else if inner.order.len() >= MAX_SNAPSHOTS {
            if let Some(oldest) = inner.order.pop_front() {
                inner.snapshots.remove(&oldest);
            }
        }
        inner.order.push_back(name.to_string());
        inner.snapshots.insert(name.to_string(), snapshot);
        Ok(())
    }

    /// Compare a stored snapshot `name` against either another stored
    /// snapshot or (when `against` is `None`/`CURRENT`) live state.
    pub fn compare(
        &self,
        name: &str,
        against: Option<&str>,
        pipeline: &CapturePipeline,
    ) -> Result<SessionDiff, GasolineError> {
        let inner = self.inner.lock();
        let before = inner
            .snapshots
            .get(name)
            .ok_or_else(|| GasolineError::SessionNotFound { id: name.to_string() })?
            .clone();
        let after = match against {
            None | Some(CURRENT) => capture(CURRENT, pipeline),
            Some(other) => inner
                .snapshots
                .get(other)
                .cloned()
                .ok_or_else(|| GasolineError::SessionNotFound { id: other.to_string() })?,
        };
        Ok(diff(&before, &after))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
