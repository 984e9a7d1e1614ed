// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout-Tracker: ingest fitness-tracker activity files per workout
//!
//! This crate provides the backend pipeline for uploaded FIT activity
//! files: gzip normalization, binary decoding, record normalization into
//! a fixed telemetry schema plus a raw auxiliary payload, and bulk
//! persistence grouped by workout name. HTTP routing, authentication and
//! rendering live in the embedding application, which talks to this
//! crate through [`services::UploadService`] and the
//! [`db::Datastore`] contract.

pub mod config;
pub mod db;
pub mod error;
pub mod fit;
pub mod models;
pub mod services;
pub mod storage;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::MemoryDb;
use storage::FileStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<MemoryDb>,
    pub store: FileStore,
}

impl AppState {
    /// Build state from configuration with the in-process datastore.
    pub fn new(config: Config) -> error::Result<Self> {
        let store = FileStore::new(&config.data_dir)?;
        Ok(Self {
            config,
            db: Arc::new(MemoryDb::new()),
            store,
        })
    }
}
