//! Bridge configuration: where the local daemon lives and how long the
//! fast-start path is allowed to wait for it.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub daemon_port: u16,
    /// Bound for `tools/call` while the capture daemon is not yet
    /// ready (spec §4.2: 500 ms).
    pub tools_call_ready_timeout: Duration,
    /// Bound for forwarding everything else once the daemon is up.
    pub forward_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            daemon_port: 7357,
            tools_call_ready_timeout: Duration::from_millis(500),
            forward_timeout: Duration::from_secs(30),
        }
    }
}

impl BridgeConfig {
    #[must_use]
    pub fn new(daemon_port: u16) -> Self {
        Self { daemon_port, ..Self::default() }
    }

    #[must_use]
    pub fn daemon_base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.daemon_port)
    }

    #[must_use]
    pub fn mcp_url(&self) -> String {
        format!("{}/mcp", self.daemon_base_url())
    }

    #[must_use]
    pub fn sse_url(&self) -> String {
        format!("{}/mcp/sse", self.daemon_base_url())
    }
}
