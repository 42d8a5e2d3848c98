// libs/appointment-cell/src/repository/mod.rs
mod memory;
mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_database::RepositoryError;

use crate::models::{Appointment, AppointmentQuery, Attachment, AttachmentOwner, MedicalRecord};

pub use memory::{InMemoryAppointmentRepository, InMemoryAttachmentRepository, InMemoryMedicalRecordRepository};
pub use supabase::{SupabaseAppointmentRepository, SupabaseAttachmentRepository, SupabaseMedicalRecordRepository};

/// Name of the storage rule that keeps a clinician's active appointments disjoint.
pub const NO_OVERLAP_CONSTRAINT: &str = "appointments_no_overlap";

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError>;

    async fn list(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, RepositoryError>;

    /// Scheduled or in-progress appointments of the clinician with
    /// `scheduled_start < end AND scheduled_end > start`.
    async fn find_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// Fails with `Conflict` when the row would overlap an active appointment of the same clinician.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;

    /// Writes only if the stored version still equals `expected_version`, else `StaleWrite`.
    /// The stored row gets `expected_version + 1`.
    async fn update(&self, appointment: Appointment, expected_version: i64) -> Result<Appointment, RepositoryError>;
}

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn insert(&self, attachment: Attachment) -> Result<Attachment, RepositoryError>;

    async fn list_for_owner(&self, owner: AttachmentOwner) -> Result<Vec<Attachment>, RepositoryError>;
}

#[async_trait]
pub trait MedicalRecordRepository: Send + Sync {
    async fn insert(&self, record: MedicalRecord) -> Result<MedicalRecord, RepositoryError>;

    /// Newest first.
    async fn list_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<MedicalRecord>, RepositoryError>;
}
