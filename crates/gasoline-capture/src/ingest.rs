//! `axum` ingest handlers for the browser agent's telemetry POSTs.
//!
//! Wired onto routes by `gasoline-server`; kept here so the pipeline
//! crate owns its own HTTP surface end to end, the way
//! `turbomcp-server::transport::http` owns its POST routes.

use crate::pipeline::CapturePipeline;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gasoline_core::entities::{EnhancedAction, LogEntry, NetworkBody, PerformanceSnapshot, WebSocketEvent};
use serde::Deserialize;
use std::sync::Arc;

/// Ingest endpoints accept either a bare array or `{"entries": [...]}`
/// (browser agents commonly wrap batches); both shapes are accepted
/// without rejecting the less common one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Batch<T> {
    Bare(Vec<T>),
    Wrapped { entries: Vec<T> },
}

impl<T> Batch<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { entries: items } => items,
        }
    }
}

fn too_large(limit: usize, actual: usize) -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(serde_json::json!({
            "error": "body_too_large",
            "limit": limit,
            "actual": actual,
        })),
    )
        .into_response()
}

fn rate_limited(endpoint: &str, dropped: u64) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "rate_limited",
            "endpoint": endpoint,
            "dropped_total": dropped,
        })),
    )
        .into_response()
}

fn bad_json(reason: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "invalid_json", "reason": reason.to_string() })),
    )
        .into_response()
}

fn accepted(count: usize) -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "accepted": count }))).into_response()
}

/// Shared body-size + rate-limit guard used by every ingest handler
/// before it is allowed to touch the pipeline.
fn admission_check(
    pipeline: &CapturePipeline,
    endpoint: &'static str,
    body: &[u8],
    limit: usize,
) -> Result<(), Response> {
    if body.len() > limit {
        return Err(too_large(limit, body.len()));
    }
    if !pipeline.rate_limiter.check(endpoint) {
        return Err(rate_limited(endpoint, pipeline.rate_limiter.dropped_count(endpoint)));
    }
    Ok(())
}

pub async fn post_logs(State(pipeline): State<Arc<CapturePipeline>>, body: axum::body::Bytes) -> Response {
    if let Err(resp) = admission_check(&pipeline, "logs", &body, crate::config::SMALL_BODY_LIMIT_BYTES) {
        return resp;
    }
    match serde_json::from_slice::<Batch<LogEntry>>(&body) {
        Ok(batch) => accepted(pipeline.ingest_logs(batch.into_items())),
        Err(e) => bad_json(e),
    }
}

pub async fn post_network_bodies(
    State(pipeline): State<Arc<CapturePipeline>>,
    body: axum::body::Bytes,
) -> Response {
    if let Err(resp) = admission_check(&pipeline, "network-bodies", &body, crate::config::SMALL_BODY_LIMIT_BYTES) {
        return resp;
    }
    match serde_json::from_slice::<Batch<NetworkBody>>(&body) {
        Ok(batch) => accepted(pipeline.ingest_network(batch.into_items())),
        Err(e) => bad_json(e),
    }
}

pub async fn post_websocket_events(
    State(pipeline): State<Arc<CapturePipeline>>,
    body: axum::body::Bytes,
) -> Response {
    if let Err(resp) = admission_check(&pipeline, "websocket-events", &body, crate::config::SMALL_BODY_LIMIT_BYTES) {
        return resp;
    }
    match serde_json::from_slice::<Batch<WebSocketEvent>>(&body) {
        Ok(batch) => accepted(pipeline.ingest_websocket(batch.into_items())),
        Err(e) => bad_json(e),
    }
}

pub async fn post_actions(State(pipeline): State<Arc<CapturePipeline>>, body: axum::body::Bytes) -> Response {
    if let Err(resp) = admission_check(&pipeline, "actions", &body, crate::config::ACTIONS_BODY_LIMIT_BYTES) {
        return resp;
    }
    match serde_json::from_slice::<Batch<EnhancedAction>>(&body) {
        Ok(batch) => accepted(pipeline.ingest_actions(batch.into_items())),
        Err(e) => bad_json(e),
    }
}

/// `/performance` is not enumerated among spec §6's ingest endpoint
/// list but the data model and regression detector (§4.6) require a
/// stream of `PerformanceSnapshot`s to compare against; added as a
/// supplemental endpoint, recorded in DESIGN.md.
pub async fn post_performance(
    State(pipeline): State<Arc<CapturePipeline>>,
    body: axum::body::Bytes,
) -> Response {
    if let Err(resp) = admission_check(&pipeline, "performance", &body, crate::config::SMALL_BODY_LIMIT_BYTES) {
        return resp;
    }
    match serde_json::from_slice::<Batch<PerformanceSnapshot>>(&body) {
        Ok(batch) => accepted(pipeline.ingest_performance(batch.into_items())),
        Err(e) => bad_json(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaptureConfig;

    #[tokio::test]
    async fn post_logs_accepts_bare_array_and_wrapped_object() {
        let pipeline = Arc::new(CapturePipeline::new(CaptureConfig::default()));
        let bare = axum::body::Bytes::from(r#"[{"level":"error","message":"a"}]"#);
        let resp = post_logs(State(pipeline.clone()), bare).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let wrapped = axum::body::Bytes::from(r#"{"entries":[{"level":"info","message":"b"}]}"#);
        let resp = post_logs(State(pipeline.clone()), wrapped).await;
        assert_eq!(resp.status(), StatusCode::OK);

        assert_eq!(pipeline.positions().logs, 2);
    }

    #[tokio::test]
    async fn post_logs_rejects_garbage_json_with_400() {
        let pipeline = Arc::new(CapturePipeline::new(CaptureConfig::default()));
        let resp = post_logs(State(pipeline), axum::body::Bytes::from("not json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_logs_rejects_oversized_body_with_413() {
        let pipeline = Arc::new(CapturePipeline::new(CaptureConfig::default()));
        let huge = vec![b'a'; crate::config::SMALL_BODY_LIMIT_BYTES + 1];
        let resp = post_logs(State(pipeline), axum::body::Bytes::from(huge)).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
