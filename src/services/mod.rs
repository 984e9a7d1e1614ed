// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Service layer: upload handling and activity ingestion.

pub mod ingest;
pub mod upload;

pub use ingest::{FitIngestor, IngestSummary};
pub use upload::UploadService;
