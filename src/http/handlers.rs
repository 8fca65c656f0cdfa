//! Axum HTTP handlers for the web server
//!
//! Provides the primary Model Context Protocol endpoint, and general metadata endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    text::{clip_chars, LOG_VALUE_MAX_CHARS},
    tools::{health_snapshot, HealthSnapshot},
};
use crate::mcp::rpc::{json_rpc_error, PARSE_ERROR};
use crate::mcp::server::handle_json_rpc_body;
use crate::AppState;

pub const CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const PREFLIGHT_ALLOW_HEADERS: &str = "content-type, authorization, mcp-session-id, x-request-id";

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json::<HealthSnapshot>(health_snapshot(&state)),
    )
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
    })
}

pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, PREFLIGHT_ALLOW_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, "86400"),
        ],
    )
}

pub async fn mcp_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = correlation_id(&headers);

    let mut response = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => match handle_json_rpc_body(&state, &correlation_id, payload).await {
            Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "request body is not valid json"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(json_rpc_error(None, PARSE_ERROR, "Parse error")),
            )
                .into_response()
        }
    };

    let response_headers = response.headers_mut();
    response_headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response_headers.insert(CORRELATION_HEADER, value);
    }

    response
}

/// Caller-supplied `x-request-id` when usable, otherwise a fresh UUID.
pub fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(&CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| clip_chars(value, LOG_VALUE_MAX_CHARS))
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
