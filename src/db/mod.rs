//! Datastore layer.
//!
//! The persistence engine is an external collaborator; the pipeline only
//! relies on the `Datastore` contract. `MemoryDb` is the in-process
//! reference implementation used by the ingestion binary and the tests.

pub mod memory;

pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Record, Workout};

/// Abstract datastore contract for workouts and records.
///
/// Implementations must make `get_or_create_workout` idempotent under
/// concurrency: two callers racing on the same name converge on a single
/// Workout (unique-name constraint; a constraint violation on insert
/// means "already exists, re-fetch" and is never surfaced as an error).
pub trait Datastore: Send + Sync {
    /// Resolve a workout by name, creating it on first reference.
    fn get_or_create_workout(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Workout, AppError>> + Send;

    /// Persist one ingestion pass's records as a single batch.
    ///
    /// The pipeline calls this at most once per successful ingestion,
    /// after the source is fully consumed.
    fn bulk_insert_records(
        &self,
        records: Vec<Record>,
    ) -> impl std::future::Future<Output = Result<(), AppError>> + Send;

    /// Look up a workout by ID.
    fn get_workout(
        &self,
        id: u64,
    ) -> impl std::future::Future<Output = Result<Option<Workout>, AppError>> + Send;

    /// All records belonging to a workout, in insertion order.
    fn records_for_workout(
        &self,
        workout_id: u64,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, AppError>> + Send;

    /// All workouts (dashboard listing).
    fn list_workouts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Workout>, AppError>> + Send;

    /// Delete a workout and cascade to its records.
    fn delete_workout(
        &self,
        id: u64,
    ) -> impl std::future::Future<Output = Result<(), AppError>> + Send;
}
