//! HTTP handlers translating the wire contract into engine calls.
//!
//! The adapter owns key extraction and status-code mapping; all admission
//! logic lives in the engine. A rate limit rejection maps to 429, an invalid
//! or missing caller identifier to 400 (explicitly no anonymous fallback).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GatekeeperError;
use crate::ratelimit::RateLimiter;

/// Header carrying the caller's rate limit key.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
}

/// Quota metadata attached to successful responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
}

/// Body of a successful `/api/data` response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub message: String,
    pub data: String,
    pub rate_limit_info: RateLimitInfo,
}

/// Body of a 429 rejection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedResponse {
    pub error: String,
    pub message: String,
    /// Whole seconds until the caller's window rolls over.
    pub retry_after: u64,
}

/// Body of `/api/rate-limit-status`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub remaining: u32,
    pub limit: u32,
    pub reset_in_seconds: u64,
    pub reset_time: DateTime<Utc>,
}

/// Body of `/api/reset-rate-limit`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
}

/// Generic request-error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "userId", default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(rename = "userId", default)]
    pub user_id: String,
}

/// `GET /api/data`: the rate-limited endpoint.
pub async fn get_data(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let key = match header_key(&headers) {
        Some(key) => key,
        None => {
            return bad_request(format!("the {} header is required", USER_ID_HEADER));
        }
    };

    match state.limiter.check(&key) {
        Ok(decision) if decision.allowed => (
            StatusCode::OK,
            Json(DataResponse {
                message: "Request successful".to_string(),
                data: "Here is your protected data".to_string(),
                rate_limit_info: RateLimitInfo {
                    remaining: decision.remaining,
                    limit: decision.limit,
                },
            }),
        )
            .into_response(),
        Ok(decision) => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(RateLimitedResponse {
                    error: "Too Many Requests".to_string(),
                    message: format!(
                        "Rate limit exceeded. Try again in {} seconds.",
                        decision.retry_after_secs
                    ),
                    retry_after: decision.retry_after_secs,
                }),
            )
                .into_response();
            if let Ok(value) = decision.retry_after_secs.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        Err(e) => error_response(e),
    }
}

/// `GET /api/rate-limit-status?userId=...`: read-only quota report.
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Response {
    match state.limiter.status(&query.user_id) {
        Ok(status) => (
            StatusCode::OK,
            Json(StatusResponse {
                remaining: status.remaining,
                limit: status.limit,
                reset_in_seconds: status.reset_in_secs,
                reset_time: status.reset_at,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /api/reset-rate-limit`: force a fresh window for one key.
pub async fn reset_limit(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Response {
    match state.limiter.reset(&request.user_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(ResetResponse {
                message: format!("Rate limit reset for user {}", request.user_id),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /health`: liveness probe.
pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

fn header_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Bad Request".to_string(),
            message,
        }),
    )
        .into_response()
}

fn error_response(error: GatekeeperError) -> Response {
    match error {
        GatekeeperError::InvalidKey(message) => bad_request(message),
        other => {
            warn!(error = %other, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: other.to_string(),
                }),
            )
                .into_response()
        }
    }
}
