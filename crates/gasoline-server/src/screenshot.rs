//! `/screenshots` ingest (spec §6): filename sanitization plus the
//! handler itself, gated entirely by `config.screenshot_dir` — when
//! unset the route simply is not mounted (see `http.rs`).

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use serde::Deserialize;

const MAX_SCREENSHOT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ScreenshotUpload {
    pub host: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// Base64-encoded JPEG bytes.
    pub data: String,
}

/// Replace every byte outside `[A-Za-z0-9._-]` with `_` (spec §6).
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

/// `{host}-{timestamp}[-{sanitized correlation id}].jpg`.
#[must_use]
pub fn build_filename(host: &str, timestamp_ms: i64, correlation_id: Option<&str>) -> String {
    let host = sanitize(host);
    match correlation_id {
        Some(id) if !id.is_empty() => format!("{host}-{timestamp_ms}-{}.jpg", sanitize(id)),
        _ => format!("{host}-{timestamp_ms}.jpg"),
    }
}

pub async fn post_screenshot(State(state): State<AppState>, Json(upload): Json<ScreenshotUpload>) -> Response {
    let Some(dir) = state.config.screenshot_dir.clone() else {
        return (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "screenshots disabled" }))).into_response();
    };

    let bytes = match base64::engine::general_purpose::STANDARD.decode(&upload.data) {
        Ok(bytes) => bytes,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid_base64", "reason": err.to_string() })),
            )
                .into_response();
        }
    };
    if bytes.len() > MAX_SCREENSHOT_BYTES {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({ "error": "body_too_large", "limit": MAX_SCREENSHOT_BYTES })),
        )
            .into_response();
    }

    let filename = build_filename(&upload.host, chrono::Utc::now().timestamp_millis(), upload.correlation_id.as_deref());
    let path = dir.join(&filename);

    if let Err(err) = tokio::fs::create_dir_all(&dir).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "internal", "reason": err.to_string() })),
        )
            .into_response();
    }
    if let Err(err) = tokio::fs::write(&path, &bytes).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "internal", "reason": err.to_string() })),
        )
            .into_response();
    }

    (StatusCode::OK, Json(serde_json::json!({ "filename": filename }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize("a b/c:d"), "a_b_c_d");
        assert_eq!(sanitize("safe-Name_1.2"), "safe-Name_1.2");
    }

    #[test]
    fn filename_omits_correlation_segment_when_absent() {
        assert_eq!(build_filename("localhost:3000", 42, None), "localhost_3000-42.jpg");
    }

    #[test]
    fn filename_includes_sanitized_correlation_segment() {
        assert_eq!(build_filename("app.com", 42, Some("req/1")), "app.com-42-req_1.jpg");
    }
}
