// libs/clinician-cell/src/services/time_off.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use identity_cell::UserService;
use shared_utils::Clock;

use crate::error::ClinicianError;
use crate::models::{TimeOff, TimeOffRequest};
use crate::repository::TimeOffRepository;

pub struct TimeOffService {
    repository: Arc<dyn TimeOffRepository>,
    users: Arc<UserService>,
    clock: Arc<dyn Clock>,
}

impl TimeOffService {
    pub fn new(repository: Arc<dyn TimeOffRepository>, users: Arc<UserService>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, users, clock }
    }

    /// Record a period requested by the clinician. It blocks nothing until approved.
    pub async fn request_time_off(&self, clinician_id: Uuid, request: TimeOffRequest) -> Result<TimeOff, ClinicianError> {
        debug!("Time-off requested by clinician {}", clinician_id);

        if request.end_datetime <= request.start_datetime {
            return Err(ClinicianError::validation("end_datetime", "must be after start_datetime"));
        }
        self.users.require_clinician(clinician_id).await?;

        let now = self.clock.now();
        let time_off = TimeOff {
            id: Uuid::new_v4(),
            clinician_id,
            start_datetime: request.start_datetime,
            end_datetime: request.end_datetime,
            reason: request.reason,
            is_approved: false,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(time_off).await?;
        info!("Time-off {} recorded for clinician {}", stored.id, clinician_id);
        Ok(stored)
    }

    /// Approving an already approved period returns it unchanged.
    pub async fn approve_time_off(&self, time_off_id: Uuid, approver_id: Uuid) -> Result<TimeOff, ClinicianError> {
        let existing = self
            .repository
            .get(time_off_id)
            .await?
            .ok_or_else(|| ClinicianError::not_found("time-off", time_off_id))?;
        if existing.is_approved {
            return Ok(existing);
        }

        let approved = self
            .repository
            .approve(time_off_id, approver_id, self.clock.now())
            .await?
            .ok_or_else(|| ClinicianError::not_found("time-off", time_off_id))?;
        info!("Time-off {} approved by {}", time_off_id, approver_id);
        Ok(approved)
    }

    pub async fn list_time_off(&self, clinician_id: Uuid, include_expired: bool) -> Result<Vec<TimeOff>, ClinicianError> {
        let ends_after = (!include_expired).then(|| self.clock.now());
        Ok(self.repository.list(clinician_id, ends_after).await?)
    }

    pub async fn find_approved_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, ClinicianError> {
        Ok(self
            .repository
            .find_approved_overlapping(clinician_id, start, end)
            .await?)
    }
}
