//! proxy::routes
//!
//! Route handlers. Each one forwards to the same path on the backend and
//! relays the JSON body on success. Any failure becomes `500` with a fixed,
//! route-specific message; backend detail only reaches the log.

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::upstream::UpstreamError;
use super::ProxyState;

pub const COMMITS_FAILED: &str = "Failed to fetch commits";
pub const CHANGELOGS_FAILED: &str = "Failed to fetch changelogs";
pub const GENERATE_FAILED: &str = "Failed to generate changelog";
pub const STATUS_FAILED: &str = "Failed to check changelog status";

/// Generic failure response.
#[derive(Debug)]
pub struct ProxyFailure {
    message: &'static str,
}

impl ProxyFailure {
    fn logged(message: &'static str, err: &UpstreamError) -> Self {
        tracing::error!(error = %err, "{}", message);
        Self { message }
    }
}

#[derive(Serialize)]
struct FailureBody {
    error: &'static str,
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FailureBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ProxyResult = Result<Json<Value>, ProxyFailure>;

/// `GET /api/commits`
#[tracing::instrument(skip(state))]
pub async fn list_commits(State(state): State<ProxyState>, RawQuery(query): RawQuery) -> ProxyResult {
    state
        .upstream
        .get_json(&["api", "commits"], query.as_deref())
        .await
        .map(Json)
        .map_err(|e| ProxyFailure::logged(COMMITS_FAILED, &e))
}

/// `GET /api/changelogs`
#[tracing::instrument(skip(state))]
pub async fn list_changelogs(
    State(state): State<ProxyState>,
    RawQuery(query): RawQuery,
) -> ProxyResult {
    state
        .upstream
        .get_json(&["api", "changelogs"], query.as_deref())
        .await
        .map(Json)
        .map_err(|e| ProxyFailure::logged(CHANGELOGS_FAILED, &e))
}

/// `POST /api/changelogs`
///
/// The body is parsed here so malformed input never reaches the backend.
#[tracing::instrument(skip_all)]
pub async fn submit_changelog(State(state): State<ProxyState>, body: Bytes) -> ProxyResult {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        ProxyFailure::logged(GENERATE_FAILED, &UpstreamError::Parse(format!("request body: {}", e)))
    })?;

    state
        .upstream
        .post_json(&["api", "changelogs"], &payload)
        .await
        .map(Json)
        .map_err(|e| ProxyFailure::logged(GENERATE_FAILED, &e))
}

/// `GET /api/changelogs/status/{id}`
#[tracing::instrument(skip(state))]
pub async fn changelog_status(State(state): State<ProxyState>, Path(id): Path<String>) -> ProxyResult {
    state
        .upstream
        .get_json(&["api", "changelogs", "status", &id], None)
        .await
        .map(Json)
        .map_err(|e| ProxyFailure::logged(STATUS_FAILED, &e))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /healthz`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
