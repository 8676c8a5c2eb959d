// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Describe image endpoint handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{error, info, warn};

use super::request::UploadedImage;
use super::response::DescribeImageResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::VlmError;

/// POST /describe-image - Generate a one-sentence description of an image
///
/// Accepts a multipart form with a `file` field and relays the image to the
/// VLM backend. Linear pipeline: validate, persist to scratch, call with
/// timeout, cleanup, respond.
///
/// # Request
/// - `file`: the image (multipart, required); declared media type must be
///   jpeg, png, or webp and the body at most 10 MiB
///
/// # Response
/// - `description`: one-sentence description text
///
/// # Errors
/// - 400 Bad Request: missing/malformed file field or unsupported media type
/// - 413 Payload Too Large: file exceeds 10 MiB
/// - 502 Bad Gateway: the VLM backend reported an error
/// - 504 Gateway Timeout: the VLM call exceeded the processing budget
/// - 500 Internal Server Error: save failure or anything else unexpected
pub async fn describe_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DescribeImageResponse>, ApiError> {
    let upload = UploadedImage::from_multipart(multipart).await?;
    info!(
        "Received image upload request for file: {} ({} bytes, {})",
        upload.filename,
        upload.size(),
        upload.media_type
    );

    upload.validate()?;

    let image_path = state
        .scratch
        .save(&upload.filename, &upload.bytes)
        .await
        .map_err(|e| {
            error!("Failed to save uploaded file: {}", e);
            ApiError::InternalError("Failed to save uploaded file".to_string())
        })?;

    info!(
        "Sending image to {} for processing...",
        state.vlm.model_name()
    );

    // The blocking call runs on a worker thread; the timeout stops waiting
    // without terminating the in-flight call.
    let vlm = state.vlm.clone();
    let call_path = image_path.clone();
    let result = tokio::time::timeout(
        state.config.processing_timeout,
        tokio::task::spawn_blocking(move || vlm.describe(&call_path)),
    )
    .await;

    // The response is already determined; a failed delete is logged inside
    // the store and never surfaced.
    state.scratch.remove(&image_path).await;

    match result {
        Ok(Ok(Ok(description))) => {
            info!("Successfully received description from VLM backend");
            Ok(Json(DescribeImageResponse { description }))
        }
        Ok(Ok(Err(VlmError::Api(message)))) => {
            error!("Ollama API error: {}", message);
            Err(ApiError::BadGateway(format!(
                "Ollama API error: {}",
                message
            )))
        }
        Ok(Ok(Err(e))) => {
            error!("Unexpected VLM error: {}", e);
            Err(ApiError::InternalError(format!(
                "Failed to process image: {}",
                e
            )))
        }
        Ok(Err(join_err)) => {
            error!("VLM worker task failed: {}", join_err);
            Err(ApiError::InternalError(
                "Internal server error during image processing".to_string(),
            ))
        }
        Err(_) => {
            warn!("Image processing timed out");
            Err(ApiError::GatewayTimeout)
        }
    }
}
