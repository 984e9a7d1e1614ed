// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory datastore.
//!
//! Reference implementation of the `Datastore` contract, backed by
//! concurrent maps. The name index uses the map's entry API, so
//! get-or-create holds the shard lock across the lookup-and-insert and
//! two racing uploads of the same filename resolve to one workout.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::Datastore;
use crate::error::AppError;
use crate::models::{Record, Workout};
use crate::time_utils::format_utc_rfc3339;

/// In-process workout datastore.
#[derive(Default)]
pub struct MemoryDb {
    workouts: DashMap<u64, Workout>,
    /// Unique index: workout name → workout ID.
    names: DashMap<String, u64>,
    /// Records per workout, in insertion order.
    records: DashMap<u64, Vec<Record>>,
    next_id: AtomicU64,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored workouts.
    pub fn workout_count(&self) -> usize {
        self.workouts.len()
    }
}

impl Datastore for MemoryDb {
    async fn get_or_create_workout(&self, name: &str) -> Result<Workout, AppError> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                let id = *existing.get();
                self.workouts
                    .get(&id)
                    .map(|w| w.value().clone())
                    .ok_or_else(|| AppError::Persistence(format!("dangling workout id {}", id)))
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let workout = Workout {
                    id,
                    name: name.to_string(),
                    created_at: format_utc_rfc3339(chrono::Utc::now()),
                };
                self.workouts.insert(id, workout.clone());
                self.records.insert(id, Vec::new());
                slot.insert(id);
                tracing::info!(id, name, "Created workout");
                Ok(workout)
            }
        }
    }

    async fn bulk_insert_records(&self, records: Vec<Record>) -> Result<(), AppError> {
        for record in records {
            let workout_id = record.workout_id;
            if !self.workouts.contains_key(&workout_id) {
                return Err(AppError::Persistence(format!(
                    "record references unknown workout {}",
                    workout_id
                )));
            }
            self.records.entry(workout_id).or_default().push(record);
        }
        Ok(())
    }

    async fn get_workout(&self, id: u64) -> Result<Option<Workout>, AppError> {
        Ok(self.workouts.get(&id).map(|w| w.value().clone()))
    }

    async fn records_for_workout(&self, workout_id: u64) -> Result<Vec<Record>, AppError> {
        Ok(self
            .records
            .get(&workout_id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    async fn list_workouts(&self) -> Result<Vec<Workout>, AppError> {
        let mut workouts: Vec<Workout> =
            self.workouts.iter().map(|w| w.value().clone()).collect();
        workouts.sort_by_key(|w| w.id);
        Ok(workouts)
    }

    async fn delete_workout(&self, id: u64) -> Result<(), AppError> {
        if let Some((_, workout)) = self.workouts.remove(&id) {
            self.names.remove(&workout.name);
            // Cascade: a workout owns its records' lifecycle.
            self.records.remove(&id);
            tracing::info!(id, name = %workout.name, "Deleted workout");
        }
        Ok(())
    }
}
