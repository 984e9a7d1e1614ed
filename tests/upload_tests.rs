// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload workflow tests: gzip normalization and storage side effects.

mod common;

use common::{create_test_app, fit_secs, gzip, FitFileBuilder};
use workout_tracker::db::Datastore;
use workout_tracker::error::AppError;

const UNIX_TS: i64 = 1_717_228_800;

fn small_activity() -> Vec<u8> {
    let mut payload = fit_secs(UNIX_TS).to_le_bytes().to_vec();
    payload.push(142);
    FitFileBuilder::new()
        .definition(0, 20, &[(253, 4, 0x86), (3, 1, 0x02)])
        .data(0, &payload)
        .build()
}

#[tokio::test]
async fn test_gzip_round_trip_yields_identical_records() {
    let plain_app = create_test_app();
    let gz_app = create_test_app();
    let file = small_activity();

    let plain = plain_app
        .uploads
        .handle_upload("ride.fit", &file)
        .await
        .unwrap();
    let wrapped = gz_app
        .uploads
        .handle_upload("ride.fit.gz", &gzip(&file))
        .await
        .unwrap();

    let plain_records = plain_app
        .db
        .records_for_workout(plain.workout_id)
        .await
        .unwrap();
    let gz_records = gz_app
        .db
        .records_for_workout(wrapped.workout_id)
        .await
        .unwrap();

    assert_eq!(plain_records.len(), gz_records.len());
    for (a, b) in plain_records.iter().zip(&gz_records) {
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.heart_rate, b.heart_rate);
        assert_eq!(a.data, b.data);
    }
}

#[tokio::test]
async fn test_gz_upload_replaces_compressed_artifact() {
    let app = create_test_app();

    app.uploads
        .handle_upload("ride.fit.gz", &gzip(&small_activity()))
        .await
        .unwrap();

    // Only the decompressed copy remains in storage.
    assert!(!app.dir.path().join("ride.fit.gz").exists());
    assert!(app.dir.path().join("ride.fit").exists());
}

#[tokio::test]
async fn test_gz_workout_is_named_after_the_uploaded_filename() {
    let app = create_test_app();

    let summary = app
        .uploads
        .handle_upload("ride.fit.gz", &gzip(&small_activity()))
        .await
        .unwrap();

    let workout = app
        .db
        .get_workout(summary.workout_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workout.name, "ride.fit.gz");
}

#[tokio::test]
async fn test_corrupt_gzip_fails_without_records() {
    let app = create_test_app();

    let result = app
        .uploads
        .handle_upload("ride.fit.gz", b"\x1f\x8b but not really gzip")
        .await;
    assert!(matches!(result, Err(AppError::Decompression(_))));

    assert!(app.db.list_workouts().await.unwrap().is_empty());
    assert!(!app.dir.path().join("ride.fit").exists());
}

#[tokio::test]
async fn test_plain_upload_is_stored_under_the_data_dir() {
    let app = create_test_app();

    app.uploads
        .handle_upload("ride.fit", &small_activity())
        .await
        .unwrap();

    assert!(app.dir.path().join("ride.fit").exists());
}

#[tokio::test]
async fn test_garbage_upload_is_rejected() {
    let app = create_test_app();

    let result = app.uploads.handle_upload("ride.fit", b"not a fit file").await;
    assert!(matches!(result, Err(AppError::Decode(_))));
    assert!(app.db.list_workouts().await.unwrap().is_empty());
}
