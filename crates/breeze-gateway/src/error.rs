// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `BreezeError` to HTTP response mapping.
//!
//! Status codes follow the error taxonomy: 404 for missing or out-of-scope
//! objects (never distinguishable), 403 for ownership failures, 400 for
//! guard rejections with the current status in the body, 429 for admission
//! with the counts, 413 for the byte ceiling, 500 for everything internal
//! with details kept out of the response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use breeze_core::BreezeError;
use serde_json::json;

pub struct ApiError(BreezeError);

impl From<BreezeError> for ApiError {
    fn from(err: BreezeError) -> Self {
        ApiError(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            BreezeError::NotFound { entity } => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{entity} not found") }),
            ),
            BreezeError::AccessDenied => {
                (StatusCode::FORBIDDEN, json!({ "error": "access denied" }))
            }
            BreezeError::InvalidState { current } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.0.to_string(), "currentStatus": current }),
            ),
            BreezeError::DeviceOffline => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "device is offline" }),
            ),
            BreezeError::AdmissionRejected {
                current_count,
                max_allowed,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": self.0.to_string(),
                    "currentCount": current_count,
                    "maxAllowed": max_allowed,
                }),
            ),
            BreezeError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": self.0.to_string(), "maxBytes": limit }),
            ),
            BreezeError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            BreezeError::Config(_)
            | BreezeError::Storage { .. }
            | BreezeError::Transport { .. }
            | BreezeError::Internal(_) => {
                tracing::error!(error = %self.0, "request failed internally");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
