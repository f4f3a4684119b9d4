//! Stdio <-> HTTP bridge (spec §4.2): reads line- or
//! `Content-Length`-framed JSON-RPC from stdin, answers a fixed set of
//! fast-start methods locally, and forwards everything else to the
//! local daemon over HTTP.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod framing;
pub mod notify;

pub use client::DaemonClient;
pub use config::BridgeConfig;
pub use dispatcher::BridgeDispatcher;
pub use framing::{FramingMode, FramingState, StdoutWriter};

use std::sync::Arc;
use tokio::io::BufReader;

/// Drives the bridge until stdin closes.
pub async fn run(config: BridgeConfig) -> std::io::Result<()> {
    let dispatcher = Arc::new(BridgeDispatcher::new(config));
    let framing = Arc::new(FramingState::default());
    let stdout = Arc::new(StdoutWriter::new());

    {
        let http = dispatcher.client().http();
        let sse_url = dispatcher.client().sse_url();
        let framing = framing.clone();
        let stdout = stdout.clone();
        tokio::spawn(async move {
            notify::run(http, sse_url, framing, stdout).await;
        });
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        let message = match framing::read_message(&mut reader, &framing).await? {
            Some(message) => message,
            None => break,
        };

        let dispatcher = dispatcher.clone();
        let framing = framing.clone();
        let stdout = stdout.clone();
        tokio::spawn(async move {
            if let Some(response) = dispatcher.handle(&message).await {
                if let Err(err) = stdout.write_frame(framing.current(), &response).await {
                    tracing::error!(%err, "failed to write stdio response");
                }
            }
        });
    }

    Ok(())
}
