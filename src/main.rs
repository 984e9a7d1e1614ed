// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout-Tracker ingestion harness
//!
//! Runs the full upload pipeline over activity files given on the
//! command line and logs a summary per file. Useful for smoke-testing
//! device exports without the web frontend.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_tracker::{config::Config, services::UploadService, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Starting ingestion");

    let state = AppState::new(config)?;
    let uploads = UploadService::new(state.store.clone(), Arc::clone(&state.db));

    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        anyhow::bail!("usage: workout-tracker <activity.fit> [more files...]");
    }

    for file in &files {
        let bytes = std::fs::read(file)?;
        let filename = std::path::Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file.as_str());

        let summary = uploads.handle_upload(filename, &bytes).await?;
        tracing::info!(
            file,
            workout_id = summary.workout_id,
            records = summary.records_inserted,
            skipped = summary.messages_skipped,
            "Upload complete"
        );
    }

    Ok(())
}

/// Initialize structured logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workout_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
