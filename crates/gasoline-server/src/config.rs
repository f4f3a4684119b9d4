//! Daemon-wide configuration: capture pipeline settings plus the
//! HTTP-surface knobs (`port`, `project_root`, the screenshot
//! directory), serde-derived with `Default` the way
//! `gasoline_capture::CaptureConfig` is built.

use gasoline_capture::CaptureConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default port the daemon listens on, matching the bridge's default
/// target (`gasoline_bridge::BridgeConfig::default`).
pub const DEFAULT_PORT: u16 = 7357;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub capture: CaptureConfig,
    /// Where `history/events.jsonl` and, when enabled, captured
    /// screenshots are written.
    pub project_root: PathBuf,
    /// `None` disables the `/screenshots` ingest endpoint entirely.
    pub screenshot_dir: Option<PathBuf>,
    pub verify_session_ttl_secs: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            capture: CaptureConfig::default(),
            project_root: PathBuf::from("."),
            screenshot_dir: None,
            verify_session_ttl_secs: gasoline_verify::session::DEFAULT_TTL_SECS,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([127, 0, 0, 1], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_matches_bridge_default() {
        assert_eq!(ServerConfig::default().port, 7357);
    }
}
