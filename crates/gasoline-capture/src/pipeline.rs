//! The capture pipeline: one ring buffer per telemetry stream, behind
//! a `parking_lot::RwLock` each (spec §3/§4.3: "each ring buffer is
//! exclusively owned by the capture pipeline").

use crate::config::CaptureConfig;
use crate::rate_limit::IngestRateLimiter;
use chrono::{DateTime, Utc};
use gasoline_core::entities::{EnhancedAction, LogEntry, NetworkBody, PerformanceSnapshot, WebSocketEvent};
use gasoline_core::ring_buffer::{BufferCursor, RingBuffer};
use parking_lot::RwLock;

/// Snapshot of every buffer's `total_added`, used by the checkpoint
/// engine without copying any data (spec §5: "checkpoints store
/// positions, not data copies").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferPositions {
    pub logs: u64,
    pub network: u64,
    pub websocket: u64,
    pub actions: u64,
}

pub struct CapturePipeline {
    config: CaptureConfig,
    logs: RwLock<RingBuffer<LogEntry>>,
    network: RwLock<RingBuffer<NetworkBody>>,
    websocket: RwLock<RingBuffer<WebSocketEvent>>,
    actions: RwLock<RingBuffer<EnhancedAction>>,
    performance: RwLock<RingBuffer<PerformanceSnapshot>>,
    pub rate_limiter: IngestRateLimiter,
}

impl CapturePipeline {
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        let rate_limiter = IngestRateLimiter::new(config.rate_limit_max_requests, config.rate_limit_window);
        Self {
            logs: RwLock::new(RingBuffer::new(config.log_capacity)),
            network: RwLock::new(RingBuffer::new(config.network_capacity)),
            websocket: RwLock::new(RingBuffer::new(config.websocket_capacity)),
            actions: RwLock::new(RingBuffer::new(config.actions_capacity)),
            performance: RwLock::new(RingBuffer::new(config.performance_capacity)),
            rate_limiter,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Ingest a batch, preserving intra-request order (spec §4.3).
    pub fn ingest_logs(&self, entries: Vec<LogEntry>) -> usize {
        let n = entries.len();
        self.logs.write().push_many(entries, Utc::now());
        n
    }

    pub fn ingest_network(&self, bodies: Vec<NetworkBody>) -> usize {
        let n = bodies.len();
        self.network.write().push_many(bodies, Utc::now());
        n
    }

    pub fn ingest_websocket(&self, events: Vec<WebSocketEvent>) -> usize {
        let n = events.len();
        self.websocket.write().push_many(events, Utc::now());
        n
    }

    pub fn ingest_actions(&self, actions: Vec<EnhancedAction>) -> usize {
        let n = actions.len();
        self.actions.write().push_many(actions, Utc::now());
        n
    }

    pub fn ingest_performance(&self, snapshots: Vec<PerformanceSnapshot>) -> usize {
        let n = snapshots.len();
        self.performance.write().push_many(snapshots, Utc::now());
        n
    }

    /// Current `total_added` of every buffer, for checkpoint creation.
    #[must_use]
    pub fn positions(&self) -> BufferPositions {
        BufferPositions {
            logs: self.logs.read().total_added(),
            network: self.network.read().total_added(),
            websocket: self.websocket.read().total_added(),
            actions: self.actions.read().total_added(),
        }
    }

    /// Copy console log entries newer than `cursor`, oldest first.
    /// Copied out under the lock per spec §5 ("slice reads that will
    /// escape a critical section are copied under the lock").
    #[must_use]
    pub fn logs_since(&self, cursor: BufferCursor) -> (Vec<LogEntry>, u64, BufferCursor) {
        let buf = self.logs.read();
        let read = buf.read_since(cursor);
        (read.items.into_iter().cloned().collect(), read.gap, read.advanced)
    }

    #[must_use]
    pub fn network_since(&self, cursor: BufferCursor) -> (Vec<NetworkBody>, u64, BufferCursor) {
        let buf = self.network.read();
        let read = buf.read_since(cursor);
        (read.items.into_iter().cloned().collect(), read.gap, read.advanced)
    }

    #[must_use]
    pub fn websocket_since(&self, cursor: BufferCursor) -> (Vec<WebSocketEvent>, u64, BufferCursor) {
        let buf = self.websocket.read();
        let read = buf.read_since(cursor);
        (read.items.into_iter().cloned().collect(), read.gap, read.advanced)
    }

    #[must_use]
    pub fn actions_since(&self, cursor: BufferCursor) -> (Vec<EnhancedAction>, u64, BufferCursor) {
        let buf = self.actions.read();
        let read = buf.read_since(cursor);
        (read.items.into_iter().cloned().collect(), read.gap, read.advanced)
    }

    #[must_use]
    pub fn performance_since(&self, cursor: BufferCursor) -> (Vec<PerformanceSnapshot>, u64, BufferCursor) {
        let buf = self.performance.read();
        let read = buf.read_since(cursor);
        (read.items.into_iter().cloned().collect(), read.gap, read.advanced)
    }

    /// The two most recent performance snapshots (current, previous),
    /// used by the regression detector's baseline comparison.
    #[must_use]
    pub fn latest_performance_pair(&self) -> (Option<PerformanceSnapshot>, Option<PerformanceSnapshot>) {
        let buf = self.performance.read();
        let mut iter = buf.iter().rev();
        let current = iter.next().cloned();
        let previous = iter.next().cloned();
        (current, previous)
    }

    /// Resolve an RFC3339/Nano timestamp to a `BufferPositions` via
    /// binary search on each buffer's `added_at` (spec §4.4).
    #[must_use]
    pub fn positions_after(&self, t: DateTime<Utc>) -> BufferPositions {
        BufferPositions {
            logs: self.logs.read().position_after(t),
            network: self.network.read().position_after(t),
            websocket: self.websocket.read().position_after(t),
            actions: self.actions.read().position_after(t),
        }
    }

    /// All currently retained console log entries (for full reads
    /// with no checkpoint, i.e. the "beginning" resolution).
    #[must_use]
    pub fn all_logs(&self) -> Vec<LogEntry> {
        self.logs.read().iter().cloned().collect()
    }
}
