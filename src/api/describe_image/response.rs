// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Describe image response types

use serde::{Deserialize, Serialize};

/// Response from image description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeImageResponse {
    /// One-sentence description text from the VLM backend
    pub description: String,
}
