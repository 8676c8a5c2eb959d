// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Uploaded image extraction and validation

use axum::extract::Multipart;

use crate::api::errors::ApiError;

/// Media types accepted for upload
pub const ALLOWED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Maximum upload size (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A single uploaded image, alive only for the duration of the request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Declared filename; keys the scratch path
    pub filename: String,
    /// Declared media type from the multipart field
    pub media_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Pull the `file` field out of a multipart form.
    ///
    /// Other fields are ignored; a missing `file` field or a malformed
    /// body is a client error.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Multipart error: {}", e)))?
        {
            if field.name() != Some("file") {
                continue;
            }

            let filename = field
                .file_name()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "upload".to_string());
            let media_type = field
                .content_type()
                .map(|c| c.to_string())
                .unwrap_or_default();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("Read error: {}", e)))?
                .to_vec();

            return Ok(Self {
                filename,
                media_type,
                bytes,
            });
        }

        Err(ApiError::InvalidRequest(
            "Missing file field in multipart form".to_string(),
        ))
    }

    /// Byte length of the upload
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Check the declared media type against the allow-list and the byte
    /// length against the ceiling
    pub fn validate(&self) -> Result<(), ApiError> {
        if !ALLOWED_MEDIA_TYPES.contains(&self.media_type.as_str()) {
            return Err(ApiError::UnsupportedMediaType(format!(
                "Unsupported file type. Allowed types: {}",
                ALLOWED_MEDIA_TYPES.join(", ")
            )));
        }

        if self.size() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large. Max size is {}MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        Ok(())
    }
}
