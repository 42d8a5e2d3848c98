mod memory;
mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_database::RepositoryError;

use crate::models::{AvailabilityWindow, Specialization, SpecializationFilter, SpecializationStatus, TimeOff};

pub use memory::{InMemoryAvailabilityRepository, InMemorySpecializationRepository, InMemoryTimeOffRepository};
pub use supabase::{SupabaseAvailabilityRepository, SupabaseSpecializationRepository, SupabaseTimeOffRepository};

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Windows of one clinician ordered by weekday then start time.
    async fn list(&self, clinician_id: Uuid, weekday: Option<u8>) -> Result<Vec<AvailabilityWindow>, RepositoryError>;

    /// Insert, or update the window with the same clinician, weekday and bounds. An update keeps
    /// the stored id and creation time.
    async fn upsert(&self, window: AvailabilityWindow) -> Result<AvailabilityWindow, RepositoryError>;

    async fn delete(&self, clinician_id: Uuid, window_id: Uuid) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait TimeOffRepository: Send + Sync {
    async fn insert(&self, time_off: TimeOff) -> Result<TimeOff, RepositoryError>;

    async fn get(&self, id: Uuid) -> Result<Option<TimeOff>, RepositoryError>;

    async fn approve(
        &self,
        id: Uuid,
        approved_by: Uuid,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<TimeOff>, RepositoryError>;

    /// Periods of a clinician, optionally only those still running after `ends_after`.
    async fn list(&self, clinician_id: Uuid, ends_after: Option<DateTime<Utc>>) -> Result<Vec<TimeOff>, RepositoryError>;

    async fn find_approved_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, RepositoryError>;
}

#[async_trait]
pub trait SpecializationRepository: Send + Sync {
    /// Fails with `Conflict` when the name or slug is taken.
    async fn insert(&self, specialization: Specialization) -> Result<Specialization, RepositoryError>;

    async fn list(&self, filter: &SpecializationFilter) -> Result<Vec<Specialization>, RepositoryError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Specialization>, RepositoryError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: SpecializationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Specialization>, RepositoryError>;

    /// Idempotent.
    async fn link_clinician(&self, clinician_id: Uuid, specialization_id: Uuid) -> Result<(), RepositoryError>;

    async fn list_for_clinician(&self, clinician_id: Uuid) -> Result<Vec<Specialization>, RepositoryError>;
}
