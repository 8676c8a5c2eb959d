// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir Vision Gateway

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-08-25";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "describe-image",
    "multipart-upload",
    "vlm-backend",
    "bounded-timeout",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Vision Gateway {} ({})", VERSION_NUMBER, BUILD_DATE)
}
