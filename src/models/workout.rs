// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout and record models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored workout: the grouping of all samples from one uploaded
/// activity file (or repeated uploads sharing a name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    /// Datastore-assigned workout ID
    pub id: u64,
    /// Workout name (derived from the uploaded filename, unique)
    pub name: String,
    /// When this workout row was created (ISO 8601)
    pub created_at: String,
}

/// One telemetry sample extracted from a "record" message.
///
/// The fixed columns cover the fields the UI charts directly; everything
/// else observed in the source message lives in `data` so new device
/// fields survive ingestion without a schema change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Owning workout ID
    pub workout_id: u64,
    /// Sample time (UTC). Messages without one are never persisted.
    pub timestamp: DateTime<Utc>,
    /// Latitude in raw semicircles
    pub position_lat: Option<i32>,
    /// Longitude in raw semicircles
    pub position_long: Option<i32>,
    /// GPS accuracy estimate in meters
    pub gps_accuracy: Option<u8>,
    /// Altitude from the enhanced (32-bit) field, meters
    pub enhanced_altitude: Option<f64>,
    /// Altitude from the legacy (16-bit) field, meters
    pub altitude: Option<f64>,
    /// Grade in percent
    pub grade: Option<f64>,
    /// Cumulative distance in meters
    pub distance: Option<f64>,
    /// Heart rate in bpm
    pub heart_rate: Option<u8>,
    /// Cumulative calories in kcal
    pub calories: Option<u16>,
    /// Speed from the enhanced (32-bit) field, m/s
    pub enhanced_speed: Option<f64>,
    /// Speed from the legacy (16-bit) field, m/s
    pub speed: Option<f64>,
    /// Head-unit battery state of charge, percent
    pub battery_soc: Option<f64>,
    /// Cumulative ascent in meters (developer field on units that emit it)
    pub ascent: Option<f64>,
    /// Every present field of the source message, keyed by field name.
    /// Timestamps are serialized as ISO 8601 strings.
    pub data: serde_json::Map<String, serde_json::Value>,
}
