// libs/appointment-cell/src/repository/supabase.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_database::{RepositoryError, SupabaseClient};

use crate::models::{Appointment, AppointmentQuery, Attachment, AttachmentKind, AttachmentOwner, MedicalRecord};

use super::{AppointmentRepository, AttachmentRepository, MedicalRecordRepository};

fn encode_time(at: DateTime<Utc>) -> String {
    urlencoding::encode(&at.to_rfc3339()).into_owned()
}

pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&limit=1", id);
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, RepositoryError> {
        let mut filters = Vec::new();
        if let Some(patient_id) = query.patient_id {
            filters.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(clinician_id) = query.clinician_id {
            filters.push(format!("clinician_id=eq.{}", clinician_id));
        }
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(from) = query.from {
            filters.push(format!("scheduled_start=gte.{}", encode_time(from)));
        }
        if let Some(to) = query.to {
            filters.push(format!("scheduled_start=lt.{}", encode_time(to)));
        }
        filters.push("order=scheduled_start.asc".to_string());
        if let Some(limit) = query.limit {
            filters.push(format!("limit={}", limit));
        }

        let path = format!("/rest/v1/appointments?{}", filters.join("&"));
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn find_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut path = format!(
            "/rest/v1/appointments?clinician_id=eq.{}&status=in.(scheduled,in_progress)&scheduled_start=lt.{}&scheduled_end=gt.{}",
            clinician_id,
            encode_time(end),
            encode_time(start),
        );
        if let Some(id) = exclude {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        debug!("Inserting appointment {}", appointment.id);
        let body = serde_json::to_value(&appointment).map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Backend("insert returned no row".to_string()))
    }

    async fn update(&self, appointment: Appointment, expected_version: i64) -> Result<Appointment, RepositoryError> {
        debug!("Updating appointment {} at version {}", appointment.id, expected_version);

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&version=eq.{}",
            appointment.id, expected_version
        );
        let body = json!({
            "clinician_id": appointment.clinician_id,
            "scheduled_start": appointment.scheduled_start,
            "scheduled_end": appointment.scheduled_end,
            "status": appointment.status,
            "priority": appointment.priority,
            "chief_complaint": appointment.chief_complaint,
            "notes": appointment.notes,
            "is_admin_override": appointment.is_admin_override,
            "cancellation_reason": appointment.cancellation_reason,
            "version": expected_version + 1,
            "updated_at": appointment.updated_at,
        });

        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, None, Some(body), Some(SupabaseClient::return_representation()))
            .await?;

        match rows.into_iter().next() {
            Some(updated) => Ok(updated),
            // Zero rows: either the id is unknown or someone else bumped the version.
            None => match self.get(appointment.id).await? {
                Some(_) => Err(RepositoryError::StaleWrite),
                None => Err(RepositoryError::NotFound),
            },
        }
    }
}

/// Attachment row as stored: the owner variant is split into two columns.
#[derive(Debug, Serialize, Deserialize)]
struct AttachmentRow {
    id: Uuid,
    owner_type: String,
    owner_id: Uuid,
    kind: AttachmentKind,
    title: String,
    storage_path: String,
    content_type: Option<String>,
    uploaded_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<&Attachment> for AttachmentRow {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id,
            owner_type: attachment.owner.type_name().to_string(),
            owner_id: attachment.owner.id(),
            kind: attachment.kind,
            title: attachment.title.clone(),
            storage_path: attachment.storage_path.clone(),
            content_type: attachment.content_type.clone(),
            uploaded_by: attachment.uploaded_by,
            created_at: attachment.created_at,
        }
    }
}

impl TryFrom<AttachmentRow> for Attachment {
    type Error = RepositoryError;

    fn try_from(row: AttachmentRow) -> Result<Self, Self::Error> {
        let owner = match row.owner_type.as_str() {
            "appointment" => AttachmentOwner::Appointment(row.owner_id),
            "patient" => AttachmentOwner::Patient(row.owner_id),
            other => return Err(RepositoryError::Backend(format!("unknown attachment owner type {}", other))),
        };
        Ok(Attachment {
            id: row.id,
            owner,
            kind: row.kind,
            title: row.title,
            storage_path: row.storage_path,
            content_type: row.content_type,
            uploaded_by: row.uploaded_by,
            created_at: row.created_at,
        })
    }
}

pub struct SupabaseAttachmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAttachmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AttachmentRepository for SupabaseAttachmentRepository {
    async fn insert(&self, attachment: Attachment) -> Result<Attachment, RepositoryError> {
        let body = serde_json::to_value(AttachmentRow::from(&attachment))
            .map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let rows: Vec<AttachmentRow> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/clinical_attachments",
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Backend("insert returned no row".to_string()))?
            .try_into()
    }

    async fn list_for_owner(&self, owner: AttachmentOwner) -> Result<Vec<Attachment>, RepositoryError> {
        let path = format!(
            "/rest/v1/clinical_attachments?owner_type=eq.{}&owner_id=eq.{}&order=created_at.asc",
            owner.type_name(),
            owner.id()
        );
        let rows: Vec<AttachmentRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        rows.into_iter().map(Attachment::try_from).collect()
    }
}

pub struct SupabaseMedicalRecordRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseMedicalRecordRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl MedicalRecordRepository for SupabaseMedicalRecordRepository {
    async fn insert(&self, record: MedicalRecord) -> Result<MedicalRecord, RepositoryError> {
        let body = serde_json::to_value(&record).map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let rows: Vec<MedicalRecord> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/medical_records",
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Backend("insert returned no row".to_string()))
    }

    async fn list_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<MedicalRecord>, RepositoryError> {
        let path = format!(
            "/rest/v1/medical_records?appointment_id=eq.{}&order=created_at.desc,id.asc",
            appointment_id
        );
        debug!("Fetching medical records for appointment {}", appointment_id);
        Ok(self.supabase.request(Method::GET, &path, None, None).await?)
    }
}
