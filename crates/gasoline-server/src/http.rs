//! axum `Router` assembly (spec §6): the `/mcp` JSON-RPC endpoint, the
//! `/mcp/sse` push channel and its paired `/mcp/messages/{sessionID}`
//! request channel, the capture ingest routes, the screenshot upload
//! route, and the CI webhook. Structured the way
//! `turbomcp-transport::axum::router::builder` assembles its own
//! `Router<AppState>` and merges a stateless sub-router onto it.

use crate::dispatcher::Dispatcher;
use crate::screenshot;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{Stream, StreamExt};
use gasoline_alerts::{CiResult, MAX_CI_BODY_BYTES};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const CLIENT_CWD_HEADER: &str = "x-gasoline-client-cwd";

fn client_cwd(headers: &HeaderMap) -> Option<&str> {
    headers.get(CLIENT_CWD_HEADER).and_then(|v| v.to_str().ok())
}

/// Build the full router for one daemon instance.
pub fn router(state: AppState) -> Router {
    let capture_routes = Router::new()
        .route("/logs", post(gasoline_capture::ingest::post_logs))
        .route("/network-bodies", post(gasoline_capture::ingest::post_network_bodies))
        .route("/websocket-events", post(gasoline_capture::ingest::post_websocket_events))
        .route("/actions", post(gasoline_capture::ingest::post_actions))
        .route("/performance", post(gasoline_capture::ingest::post_performance))
        .with_state(state.pipeline.clone());

    let mut app = Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/mcp/sse", get(handle_sse))
        .route("/mcp/messages/{session_id}", post(handle_mcp_message))
        .route("/api/ci/webhook", post(handle_ci_webhook))
        .merge(capture_routes);

    if state.config.screenshot_dir.is_some() {
        app = app.route("/screenshots", post(screenshot::post_screenshot));
    }

    app.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

async fn handle_mcp_post(State(state): State<AppState>, headers: HeaderMap, body: axum::body::Bytes) -> Response {
    let raw = String::from_utf8_lossy(&body);
    let dispatcher = Dispatcher::new(state);
    match dispatcher.handle(&raw, client_cwd(&headers)).await {
        Some(response) => (StatusCode::OK, [("content-type", "application/json")], response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Open an SSE session (spec §6): the first event carries the
/// session-scoped POST URL the client must use for
/// `/mcp/messages/{sessionID}`; everything after is a pushed
/// notification or a response to a request made over that POST route.
async fn handle_sse(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session_id, rx) = state.sse.register().await;
    let endpoint = Event::default().event("endpoint").data(format!("/mcp/messages/{session_id}"));
    let messages = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(data) => Some(Ok(Event::default().event("message").data(data))),
            Err(_lagged) => None,
        }
    });
    let stream = futures::stream::once(async move { Ok(endpoint) }).chain(messages);
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Deliver one JSON-RPC request bound to an SSE session: the response
/// (if any) is pushed over that session's event stream rather than
/// returned in this POST's body (spec §6).
async fn handle_mcp_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    if !state.sse.contains(&session_id).await {
        return (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "unknown_session" }))).into_response();
    }

    let raw = String::from_utf8_lossy(&body);
    let dispatcher = Dispatcher::new(state.clone());
    match dispatcher.handle(&raw, client_cwd(&headers)).await {
        Some(response) => match state.sse.send_message(&session_id, &response).await {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(gasoline_sse::SseError::SessionNotFound(_)) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "unknown_session" }))).into_response()
            }
            Err(gasoline_sse::SseError::ConnectionClosed(_)) => {
                (StatusCode::GONE, Json(serde_json::json!({ "error": "connection_closed" }))).into_response()
            }
        },
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_ci_webhook(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    if body.len() > MAX_CI_BODY_BYTES {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({ "error": "body_too_large", "limit": MAX_CI_BODY_BYTES })),
        )
            .into_response();
    }
    let result: CiResult = match serde_json::from_slice(&body) {
        Ok(result) => result,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid_json", "reason": err.to_string() })),
            )
                .into_response();
        }
    };

    let alert = result.to_alert();
    state.alert_buffer.upsert_ci_result(result);
    state.alert_buffer.add_alert(alert);

    (StatusCode::OK, Json(serde_json::json!({ "accepted": true }))).into_response()
}
