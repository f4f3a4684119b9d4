//! Forwarding client: the bridge's only outbound HTTP dependency on the
//! local daemon.

use crate::config::BridgeConfig;
use gasoline_core::GasolineError;
use std::time::Duration;

const CLIENT_CWD_HEADER: &str = "X-Gasoline-Client-Cwd";

#[derive(Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    config: BridgeConfig,
    cwd: String,
}

impl DaemonClient {
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.forward_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let cwd = std::env::current_dir().map(|p| p.display().to_string()).unwrap_or_default();
        Self { http, config, cwd }
    }

    #[must_use]
    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    #[must_use]
    pub fn sse_url(&self) -> String {
        self.config.sse_url()
    }

    /// POST `raw` to the daemon's `/mcp` endpoint, returning its
    /// response body verbatim. The daemon echoes back a full JSON-RPC
    /// envelope, so the bridge does not need to re-parse it.
    pub async fn forward(&self, raw: &str) -> Result<String, GasolineError> {
        let response = self
            .http
            .post(self.config.mcp_url())
            .header(CLIENT_CWD_HEADER, &self.cwd)
            .header("content-type", "application/json")
            .body(raw.to_string())
            .send()
            .await
            .map_err(GasolineError::internal)?;

        response.text().await.map_err(GasolineError::internal)
    }

    /// Forward within a hard deadline, used by the `tools/call`
    /// fast-start path (spec §4.2: 500 ms bound, never block
    /// indefinitely on the daemon).
    pub async fn forward_with_deadline(&self, raw: &str, deadline: Duration) -> Result<String, GasolineError> {
        match tokio::time::timeout(deadline, self.forward(raw)).await {
            Ok(result) => result,
            Err(_) => Err(GasolineError::UpstreamTimeout(deadline)),
        }
    }

    /// Fire-and-forget forward for notifications; the daemon's
    /// response (204 or otherwise) is not meaningful to the stdio side.
    pub async fn forward_notification(&self, raw: &str) {
        if let Err(err) = self.forward(raw).await {
            tracing::debug!(%err, "failed to forward notification to daemon");
        }
    }
}
