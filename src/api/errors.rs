// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON error envelope returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error taxonomy for the describe-image pipeline
///
/// Every failure is caught at the handler boundary and serialized as an
/// [`ErrorResponse`] with the matching status code; nothing propagates to
/// the transport layer as an unhandled fault.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Declared media type is outside the allow-list
    UnsupportedMediaType(String),
    /// Upload exceeds the size ceiling
    PayloadTooLarge(String),
    /// Malformed multipart body or missing file field
    InvalidRequest(String),
    /// Upstream VLM service reported an error
    BadGateway(String),
    /// Upstream call exceeded the wall-clock budget
    GatewayTimeout,
    /// Save failure or anything else unexpected
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedMediaType(_) | ApiError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnsupportedMediaType(msg) => write!(f, "{}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "{}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "{}", msg),
            ApiError::BadGateway(msg) => write!(f, "{}", msg),
            ApiError::GatewayTimeout => write!(f, "Image processing timed out"),
            ApiError::InternalError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
