// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control API's error buckets (spec §7): `ClientError` → 400,
//! `NotFoundError` → 404, everything else → 500. One `IntoResponse` impl
//! here instead of ad-hoc status codes scattered through handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oj_wire::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid job_id format (must be a UUID)")]
    InvalidJobId,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Fault(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidJobId => (StatusCode::BAD_REQUEST, "Invalid job_id format (must be UUID)".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Fault(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
