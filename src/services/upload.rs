// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload workflow: store the raw upload, normalize compression, ingest.
//!
//! This is the single entry point the request-handling layer calls per
//! uploaded file. The workout name is the original filename, so
//! re-uploading the same file appends to the same workout.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::services::ingest::{FitIngestor, IngestSummary};
use crate::storage::FileStore;

/// Compression suffix recognized on uploaded filenames.
const GZIP_SUFFIX: &str = ".gz";

/// Per-upload pipeline over a file store and a datastore.
pub struct UploadService<D: Datastore> {
    store: FileStore,
    ingestor: FitIngestor<D>,
}

impl<D: Datastore> UploadService<D> {
    pub fn new(store: FileStore, db: Arc<D>) -> Self {
        Self {
            store,
            ingestor: FitIngestor::new(db),
        }
    }

    /// Run the full upload pipeline for one file.
    ///
    /// Stores the bytes, decompresses gzip-wrapped uploads in place, and
    /// ingests the resulting activity file under the original filename.
    pub async fn handle_upload(&self, filename: &str, bytes: &[u8]) -> Result<IngestSummary> {
        tracing::info!(filename, bytes = bytes.len(), "Handling upload");

        let stored = self.store.save(filename, bytes)?;
        let path = decompress_if_gzipped(&stored)?;

        self.ingestor.ingest_file(&path, filename).await
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }
}

/// Normalize a stored upload to an uncompressed activity file.
///
/// If `path` carries the gzip suffix: decompress the whole stream next to
/// it (suffix stripped), delete the compressed original, and return the
/// new path. The decompressed copy is written to a temporary sibling and
/// renamed into place so a crash never leaves a half-written file at the
/// target path. Non-gzip paths are returned unchanged.
pub fn decompress_if_gzipped(path: &Path) -> Result<PathBuf> {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return Ok(path.to_path_buf()),
    };
    if !name.ends_with(GZIP_SUFFIX) || name.len() <= GZIP_SUFFIX.len() {
        return Ok(path.to_path_buf());
    }

    let target = path.with_file_name(&name[..name.len() - GZIP_SUFFIX.len()]);

    let compressed = std::fs::read(path)?;
    let mut decoded = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| AppError::Decompression(e.to_string()))?;

    let tmp = path.with_file_name(format!("{}.part", name));
    std::fs::write(&tmp, &decoded)?;
    if let Err(e) = std::fs::rename(&tmp, &target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    std::fs::remove_file(path)?;

    tracing::debug!(
        from = %path.display(),
        to = %target.display(),
        "Decompressed upload"
    );
    Ok(target)
}
