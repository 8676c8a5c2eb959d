// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Describe image API endpoint module
//!
//! Provides POST /describe-image for generating one-sentence image
//! descriptions from multipart uploads.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::describe_image_handler;
pub use request::UploadedImage;
pub use response::DescribeImageResponse;
