//! Forwards push notifications from the daemon's SSE stream onto
//! stdout, sharing the one stdout mutex with the request/response
//! loop (spec §4.2/§4.7).

use crate::framing::{FramingState, StdoutWriter};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Runs until cancelled; reconnects on every stream failure. Parses
/// `data: ...` lines out of the `text/event-stream` body and writes
/// each payload as one framed stdio message.
pub async fn run(http: reqwest::Client, sse_url: String, framing: Arc<FramingState>, stdout: Arc<StdoutWriter>) {
    loop {
        match http.get(&sse_url).send().await {
            Ok(response) => {
                if let Err(err) = forward_stream(response, &framing, &stdout).await {
                    tracing::debug!(%err, "sse stream ended");
                }
            }
            Err(err) => {
                tracing::debug!(%err, "sse connect failed, will retry");
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn forward_stream(
    response: reqwest::Response,
    framing: &FramingState,
    stdout: &StdoutWriter,
) -> Result<(), reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        buffer.push_str(&String::from_utf8_lossy(&chunk?));
        while let Some(idx) = buffer.find('\n') {
            let line = buffer[..idx].trim_end_matches('\r').to_string();
            buffer.drain(..=idx);
            if let Some(data) = line.strip_prefix("data:") {
                let payload = data.trim();
                if !payload.is_empty() {
                    if let Err(err) = stdout.write_frame(framing.current(), payload).await {
                        tracing::warn!(%err, "failed to write pushed notification to stdout");
                    }
                }
            }
        }
    }
    Ok(())
}
