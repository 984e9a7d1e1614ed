// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types covering the upload pipeline.

use crate::fit::DecodeError;

/// Application error type.
///
/// Every variant is fatal to the current upload: the caller rejects the
/// upload and no records from that attempt are committed (a pre-existing
/// Workout row from get-or-create is harmless).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid compressed upload: {0}")]
    Decompression(String),

    #[error("Activity file decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("File storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Datastore error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for the upload pipeline.
pub type Result<T> = std::result::Result<T, AppError>;
