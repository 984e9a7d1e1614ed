// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local file storage for uploaded activity files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Byte storage rooted at a data directory.
///
/// Uploaded files are written under the root by their final path
/// component only, so callers cannot place files outside it.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store raw bytes under the filename's final component and return
    /// the stored path.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unusable filename: {filename:?}")))?;
        let path = self.root.join(name);
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");
        Ok(path)
    }

    /// Open a stored file for reading.
    pub fn open(&self, path: &Path) -> Result<fs::File> {
        Ok(fs::File::open(path)?)
    }

    /// Delete a stored file.
    pub fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)?;
        Ok(())
    }
}
