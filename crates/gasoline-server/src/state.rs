//! `AppState`: one `Arc` handle per subsystem, shared across the HTTP
//! router, the MCP dispatcher and the background detector tasks
//! (spec §5: "a single daemon process owns every subsystem").

use crate::alert_log::AlertLog;
use crate::config::ServerConfig;
use gasoline_alerts::{AlertBuffer, AnomalyDetector, RegressionDetector};
use gasoline_capture::CapturePipeline;
use gasoline_checkpoint::CheckpointManager;
use gasoline_clients::ClientRegistry;
use gasoline_sse::SseRegistry;
use gasoline_stream::StreamState;
use gasoline_temporal::TemporalGraph;
use gasoline_verify::{SnapshotStore, VerificationManager};
use std::sync::Arc;

/// Everything a tool handler or ingest route needs, cloned cheaply
/// (every field is an `Arc` or already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pipeline: Arc<CapturePipeline>,
    pub checkpoints: Arc<CheckpointManager>,
    pub verification: Arc<VerificationManager>,
    pub snapshots: Arc<SnapshotStore>,
    pub alert_buffer: Arc<AlertBuffer>,
    pub alert_log: Arc<AlertLog>,
    pub anomaly: Arc<AnomalyDetector>,
    pub regression: Arc<RegressionDetector>,
    pub stream: Arc<StreamState>,
    pub sse: Arc<SseRegistry>,
    pub clients: Arc<ClientRegistry>,
    pub temporal: Arc<TemporalGraph>,
}

impl AppState {
    /// Build a fresh daemon state from `config`, opening the temporal
    /// event graph at `config.project_root` (spec §4.10).
    pub fn new(config: ServerConfig) -> gasoline_core::GasolineResult<Self> {
        let temporal = TemporalGraph::open(&config.project_root)?;
        let verify_ttl = config.verify_session_ttl_secs;
        Ok(Self {
            pipeline: Arc::new(CapturePipeline::new(config.capture.clone())),
            checkpoints: Arc::new(CheckpointManager::new()),
            verification: Arc::new(VerificationManager::new(verify_ttl)),
            snapshots: Arc::new(SnapshotStore::new()),
            alert_buffer: Arc::new(AlertBuffer::new()),
            alert_log: Arc::new(AlertLog::new()),
            anomaly: Arc::new(AnomalyDetector::new()),
            regression: Arc::new(RegressionDetector::new()),
            stream: Arc::new(StreamState::default()),
            sse: Arc::new(SseRegistry::new()),
            clients: Arc::new(ClientRegistry::new()),
            temporal: Arc::new(temporal),
            config: Arc::new(config),
        })
    }

    /// Resolve the client id for a request, from the
    /// `X-Gasoline-Client-Cwd` header the bridge sends (spec §4.9),
    /// registering it if this is the first time we've seen that cwd.
    #[must_use]
    pub fn resolve_client(&self, cwd_header: Option<&str>) -> gasoline_clients::Client {
        match cwd_header {
            Some(cwd) if !cwd.is_empty() => self.clients.register(cwd),
            _ => self.clients.get_or_default(""),
        }
    }
}
