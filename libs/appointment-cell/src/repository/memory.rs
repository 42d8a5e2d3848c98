// libs/appointment-cell/src/repository/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::RepositoryError;

use crate::models::{Appointment, AppointmentQuery, Attachment, AttachmentOwner, MedicalRecord, TimeSlot};

use super::{AppointmentRepository, AttachmentRepository, MedicalRecordRepository, NO_OVERLAP_CONSTRAINT};

/// Process-local store. Enforces the same exclusion rule as the Postgres constraint.
#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    rows: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, whatever their status.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn check_exclusion(rows: &HashMap<Uuid, Appointment>, candidate: &Appointment) -> Result<(), RepositoryError> {
    match rows.values().find(|existing| existing.clashes_with(candidate)) {
        Some(existing) => Err(RepositoryError::Conflict {
            constraint: NO_OVERLAP_CONSTRAINT.to_string(),
            conflicting_id: Some(existing.id),
        }),
        None => Ok(()),
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, RepositoryError> {
        let mut found: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.scheduled_start, a.id));
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn find_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let probe = TimeSlot { start, end };
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|a| {
                a.clinician_id == Some(clinician_id)
                    && a.occupies_time()
                    && Some(a.id) != exclude
                    && a.slot().overlaps(&probe)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&appointment.id) {
            return Err(RepositoryError::conflict("appointments_pkey"));
        }
        check_exclusion(&rows, &appointment)?;
        rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, mut appointment: Appointment, expected_version: i64) -> Result<Appointment, RepositoryError> {
        let mut rows = self.rows.write().await;
        let stored_version = rows
            .get(&appointment.id)
            .map(|stored| stored.version)
            .ok_or(RepositoryError::NotFound)?;
        if stored_version != expected_version {
            return Err(RepositoryError::StaleWrite);
        }
        check_exclusion(&rows, &appointment)?;

        appointment.version = expected_version + 1;
        rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }
}

#[derive(Default)]
pub struct InMemoryAttachmentRepository {
    rows: RwLock<Vec<Attachment>>,
}

impl InMemoryAttachmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttachmentRepository for InMemoryAttachmentRepository {
    async fn insert(&self, attachment: Attachment) -> Result<Attachment, RepositoryError> {
        self.rows.write().await.push(attachment.clone());
        Ok(attachment)
    }

    async fn list_for_owner(&self, owner: AttachmentOwner) -> Result<Vec<Attachment>, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|a| a.owner == owner)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryMedicalRecordRepository {
    rows: RwLock<Vec<MedicalRecord>>,
}

impl InMemoryMedicalRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MedicalRecordRepository for InMemoryMedicalRecordRepository {
    async fn insert(&self, record: MedicalRecord) -> Result<MedicalRecord, RepositoryError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.id == record.id) {
            return Err(RepositoryError::conflict("medical_records_pkey"));
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn list_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<MedicalRecord>, RepositoryError> {
        let mut records: Vec<MedicalRecord> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| r.appointment_id == appointment_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}
