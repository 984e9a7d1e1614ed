// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity ingestion service.
//!
//! Handles the core workflow:
//! 1. Decode the activity file into messages
//! 2. Resolve-or-create the named workout
//! 3. Normalize each "record" message into a Record row
//! 4. Bulk-persist all rows in one batch
//!
//! The batch is only written after the whole file decodes cleanly, so a
//! decode failure mid-stream commits nothing.

use std::path::Path;
use std::sync::Arc;

use crate::db::Datastore;
use crate::error::Result;
use crate::fit::{FieldValue, FitDecoder, FitMessage};
use crate::models::Record;

/// Turns decoded activity files into persisted records under a workout.
pub struct FitIngestor<D: Datastore> {
    db: Arc<D>,
}

/// Result of one ingestion pass.
#[derive(Debug)]
pub struct IngestSummary {
    pub workout_id: u64,
    pub records_inserted: usize,
    /// "record" messages dropped for lacking a timestamp.
    pub messages_skipped: usize,
}

impl<D: Datastore> FitIngestor<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Ingest one uncompressed activity file under a workout name.
    ///
    /// Records accumulate in memory and are committed as a single batch
    /// once the message sequence is exhausted; any decoder error aborts
    /// the pass before anything is written. The workout row itself is
    /// created up front (get-or-create) and is harmless if the pass
    /// later fails.
    pub async fn ingest_file(&self, path: &Path, workout_name: &str) -> Result<IngestSummary> {
        let decoder = FitDecoder::open(path)?;
        let workout = self.db.get_or_create_workout(workout_name).await?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for message in decoder {
            let message = message?;
            if message.name != "record" {
                continue;
            }
            match build_record(workout.id, &message) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        let inserted = records.len();
        self.db.bulk_insert_records(records).await?;

        tracing::info!(
            workout_id = workout.id,
            workout = %workout.name,
            inserted,
            skipped,
            "Ingested activity file"
        );

        Ok(IngestSummary {
            workout_id: workout.id,
            records_inserted: inserted,
            messages_skipped: skipped,
        })
    }
}

/// Normalize one "record" message into a Record row.
///
/// Every present field lands in the auxiliary mapping; the fixed schema
/// is extracted by name on top of that. Messages without an absolute
/// timestamp produce no row (and no error).
fn build_record(workout_id: u64, message: &FitMessage) -> Option<Record> {
    let mut data = serde_json::Map::new();
    for field in &message.fields {
        if let Some(value) = &field.value {
            data.insert(field.name.clone(), value.to_json());
        }
    }

    let timestamp = match message.field("timestamp") {
        Some(FieldValue::Timestamp(t)) => *t,
        _ => return None,
    };

    Some(Record {
        workout_id,
        timestamp,
        position_lat: i32_field(message, "position_lat"),
        position_long: i32_field(message, "position_long"),
        gps_accuracy: u8_field(message, "gps_accuracy"),
        enhanced_altitude: f64_field(message, "enhanced_altitude"),
        altitude: f64_field(message, "altitude"),
        grade: f64_field(message, "grade"),
        distance: f64_field(message, "distance"),
        heart_rate: u8_field(message, "heart_rate"),
        calories: u16_field(message, "calories"),
        enhanced_speed: f64_field(message, "enhanced_speed"),
        speed: f64_field(message, "speed"),
        battery_soc: f64_field(message, "battery_soc"),
        ascent: f64_field(message, "ascent"),
        data,
    })
}

fn f64_field(message: &FitMessage, name: &str) -> Option<f64> {
    message.field(name).and_then(FieldValue::as_f64)
}

fn i32_field(message: &FitMessage, name: &str) -> Option<i32> {
    match message.field(name)? {
        FieldValue::SInt(v) => i32::try_from(*v).ok(),
        FieldValue::UInt(v) => i32::try_from(*v).ok(),
        _ => None,
    }
}

fn u8_field(message: &FitMessage, name: &str) -> Option<u8> {
    match message.field(name)? {
        FieldValue::UInt(v) => u8::try_from(*v).ok(),
        _ => None,
    }
}

fn u16_field(message: &FitMessage, name: &str) -> Option<u16> {
    match message.field(name)? {
        FieldValue::UInt(v) => u16::try_from(*v).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::FitField;
    use chrono::TimeZone;

    fn record_message(fields: Vec<(&str, Option<FieldValue>)>) -> FitMessage {
        FitMessage {
            name: "record".to_string(),
            global: 20,
            fields: fields
                .into_iter()
                .map(|(name, value)| FitField {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_record_extracts_fixed_fields_and_aux_mapping() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let message = record_message(vec![
            ("timestamp", Some(FieldValue::Timestamp(ts))),
            ("heart_rate", Some(FieldValue::UInt(140))),
            ("distance", Some(FieldValue::Float(12.3))),
        ]);

        let record = build_record(7, &message).expect("timestamped message yields a record");
        assert_eq!(record.workout_id, 7);
        assert_eq!(record.timestamp, ts);
        assert_eq!(record.heart_rate, Some(140));
        assert_eq!(record.distance, Some(12.3));
        assert_eq!(record.speed, None);

        assert_eq!(
            record.data.get("timestamp").unwrap(),
            &serde_json::json!("2024-01-01T10:00:00Z")
        );
        assert_eq!(
            record.data.get("heart_rate").unwrap(),
            &serde_json::json!(140)
        );
        assert_eq!(
            record.data.get("distance").unwrap(),
            &serde_json::json!(12.3)
        );
    }

    #[test]
    fn test_build_record_drops_message_without_timestamp() {
        let message = record_message(vec![("heart_rate", Some(FieldValue::UInt(150)))]);
        assert!(build_record(7, &message).is_none());
    }

    #[test]
    fn test_absent_values_stay_out_of_aux_mapping() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let message = record_message(vec![
            ("timestamp", Some(FieldValue::Timestamp(ts))),
            ("heart_rate", None),
            ("unknown_61", Some(FieldValue::UInt(9))),
        ]);

        let record = build_record(1, &message).unwrap();
        assert_eq!(record.heart_rate, None);
        assert!(!record.data.contains_key("heart_rate"));
        // Fields outside the fixed schema still land in the mapping.
        assert_eq!(record.data.get("unknown_61").unwrap(), &serde_json::json!(9));
    }

    #[test]
    fn test_relative_timestamp_is_not_a_wall_clock() {
        // A record whose timestamp decoded as relative seconds (numeric,
        // not a wall-clock instant) cannot anchor a row.
        let message = record_message(vec![("timestamp", Some(FieldValue::UInt(1200)))]);
        assert!(build_record(1, &message).is_none());
    }
}
