// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scratch directory for transient uploads
//!
//! Files live only for the duration of a single request: written before the
//! VLM call, removed after it resolves. This is not a durable store.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Handle to the scratch directory
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    /// Create a store rooted at `root`, creating the directory if absent
    pub async fn init(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under the declared filename and return the full path.
    ///
    /// Only the final path component of `filename` is used, so a declared
    /// name can never escape the scratch root. A second upload with the
    /// same name overwrites the first; concurrent uploads with identical
    /// names race on this path (accepted limitation).
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let path = self.root.join(name);

        info!("Saving uploaded file to: {}", path.display());
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Delete a scratch file, best-effort.
    ///
    /// A failed delete is logged and swallowed; it never changes the
    /// response already determined by the main path.
    pub async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("Removed temporary file: {}", path.display()),
            Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
        }
    }
}
