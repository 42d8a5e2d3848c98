// libs/clinician-cell/src/models.rs
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A weekly open window. `weekday` counts from Sunday = 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub clinician_id: Uuid,
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_recurring: bool,
    pub is_available: bool,
    pub override_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.is_available && self.start_time <= start && end <= self.end_time
    }

    /// Windows are identified by clinician, weekday and bounds.
    pub fn same_slot(&self, other: &AvailabilityWindow) -> bool {
        self.clinician_id == other.clinician_id
            && self.weekday == other.weekday
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAvailabilityRequest {
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_true")]
    pub is_recurring: bool,
    pub override_reason: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub weekday: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOff {
    pub id: Uuid,
    pub clinician_id: Uuid,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub reason: Option<String>,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeOff {
    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_datetime < end && self.end_datetime > start
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_datetime <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeOffQuery {
    #[serde(default)]
    pub include_expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializationStatus {
    Active,
    Inactive,
}

impl SpecializationStatus {
    pub fn toggled(self) -> Self {
        match self {
            SpecializationStatus::Active => SpecializationStatus::Inactive,
            SpecializationStatus::Inactive => SpecializationStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub is_surgical: bool,
    pub is_primary_care: bool,
    pub status: SpecializationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Specialization {
    pub fn is_active(&self) -> bool {
        self.status == SpecializationStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpecializationRequest {
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub is_surgical: bool,
    #[serde(default)]
    pub is_primary_care: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecializationFilter {
    pub department: Option<String>,
    pub is_surgical: Option<bool>,
    pub is_primary_care: Option<bool>,
    #[serde(default)]
    pub include_inactive: bool,
}

impl SpecializationFilter {
    pub fn matches(&self, specialization: &Specialization) -> bool {
        (self.include_inactive || specialization.is_active())
            && self
                .department
                .as_ref()
                .map_or(true, |dept| specialization.department.as_deref() == Some(dept.as_str()))
            && self.is_surgical.map_or(true, |flag| specialization.is_surgical == flag)
            && self.is_primary_care.map_or(true, |flag| specialization.is_primary_care == flag)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignSpecializationRequest {
    pub slug: String,
}

/// URL slug of a specialization name: lowercase words joined by `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
