// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppointmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Active appointments occupy the clinician's time.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppointmentError> {
        if end <= start {
            return Err(AppointmentError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Back-to-back slots (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub const DEFAULT_PRIORITY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinician_id: Option<Uuid>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: AppointmentStatus,
    /// 1 is the most urgent.
    pub priority: u8,
    pub chief_complaint: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_admin_override: bool,
    pub cancellation_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.scheduled_start,
            end: self.scheduled_end,
        }
    }

    pub fn occupies_time(&self) -> bool {
        self.status.is_active()
    }

    /// Whether two appointments would violate the one-clinician-one-slot rule.
    pub fn clashes_with(&self, other: &Appointment) -> bool {
        self.id != other.id
            && self.clinician_id.is_some()
            && self.clinician_id == other.clinician_id
            && self.occupies_time()
            && other.occupies_time()
            && self.slot().overlaps(&other.slot())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub clinician_id: Option<Uuid>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub chief_complaint: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<u8>,
    #[serde(default)]
    pub is_admin_override: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    #[serde(default)]
    pub is_admin_override: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransitionRequest {
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTransitionRequest {
    pub appointment_ids: Vec<Uuid>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedTransition {
    pub appointment_id: Uuid,
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkTransitionReport {
    pub changed: Vec<Appointment>,
    pub rejected: Vec<RejectedTransition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignClinicianRequest {
    pub clinician_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub patient_id: Option<Uuid>,
    pub clinician_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Appointments starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Appointments starting before this instant.
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AppointmentQuery {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.clinician_id.map_or(true, |id| appointment.clinician_id == Some(id))
            && self.status.map_or(true, |status| appointment.status == status)
            && self.from.map_or(true, |from| appointment.scheduled_start >= from)
            && self.to.map_or(true, |to| appointment.scheduled_start < to)
    }
}

// Attachments

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AttachmentOwner {
    Appointment(Uuid),
    Patient(Uuid),
}

impl AttachmentOwner {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttachmentOwner::Appointment(_) => "appointment",
            AttachmentOwner::Patient(_) => "patient",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            AttachmentOwner::Appointment(id) | AttachmentOwner::Patient(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Document,
    Prescription,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub owner: AttachmentOwner,
    pub kind: AttachmentKind,
    pub title: String,
    pub storage_path: String,
    pub content_type: Option<String>,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachmentRequest {
    pub kind: AttachmentKind,
    pub title: String,
    pub storage_path: String,
    pub content_type: Option<String>,
}

// Medical records

/// Clinical notes written by the assigned clinician for one appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub medication: Option<String>,
    pub follow_up: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMedicalRecordRequest {
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub medication: Option<String>,
    pub follow_up: Option<String>,
}
