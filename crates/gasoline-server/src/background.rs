//! Background detector/alert/stream loops (spec §4.6/§4.7/§5): these
//! are the only tasks that poll the capture pipeline on a timer rather
//! than in response to a request.

use crate::state::AppState;
use gasoline_core::ring_buffer::BufferCursor;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Spawn the three sweep loops, returning their join handles so the
/// caller can decide whether to await or detach them.
pub fn spawn(state: AppState) -> Vec<tokio::task::JoinHandle<()>> {
    vec![
        tokio::spawn(anomaly_sweep(state.clone())),
        tokio::spawn(regression_sweep(state.clone())),
        tokio::spawn(alert_drain_loop(state)),
    ]
}

/// Feed newly-ingested console errors to the anomaly detector,
/// pushing anything it fires into the alert buffer.
async fn anomaly_sweep(state: AppState) {
    let mut cursor = BufferCursor::zero();
    loop {
        tokio::time::sleep(SWEEP_INTERVAL).await;
        let (entries, _gap, advanced) = state.pipeline.logs_since(cursor);
        cursor = advanced;
        for entry in entries.iter().filter(|e| e.is_error()) {
            let at = entry
                .0
                .get("timestamp")
                .and_then(|v| v.as_str())
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(chrono::Utc::now);
            if let Some(alert) = state.anomaly.record_error(at) {
                state.alert_buffer.add_alert(alert);
            }
        }
    }
}

/// Feed newly-ingested performance snapshots to the regression
/// detector.
async fn regression_sweep(state: AppState) {
    let mut cursor = BufferCursor::zero();
    loop {
        tokio::time::sleep(SWEEP_INTERVAL).await;
        let (snapshots, _gap, advanced) = state.pipeline.performance_since(cursor);
        cursor = advanced;
        for snapshot in &snapshots {
            for alert in state.regression.evaluate(snapshot) {
                state.alert_buffer.add_alert(alert);
            }
        }
    }
}

/// Drain the pending alert buffer, append the result to the durable
/// alert log (so checkpoint diffs can see it, spec §4.4/S6), offer
/// each alert to the push-notification stream, and broadcast whatever
/// clears the gate over SSE.
async fn alert_drain_loop(state: AppState) {
    loop {
        tokio::time::sleep(SWEEP_INTERVAL).await;
        let drained = state.alert_buffer.drain_alerts();
        if drained.is_empty() {
            continue;
        }
        state.alert_log.append(drained.clone());
        for alert in &drained {
            if let Some(notification) = state.stream.offer(alert) {
                state.sse.broadcast_notification(&notification).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use gasoline_alerts::{Alert, Category, Severity};

    #[tokio::test]
    async fn alert_drain_loop_moves_pending_alerts_into_the_durable_log() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig { project_root: dir.path().to_path_buf(), ..ServerConfig::default() }).unwrap();
        state.alert_buffer.add_alert(Alert::new(Severity::Warning, Category::Regression, "slow", "d", "s"));

        let drained = state.alert_buffer.drain_alerts();
        assert_eq!(drained.len(), 1);
        state.alert_log.append(drained);
        assert_eq!(state.alert_log.watermark(), 1);
    }
}
