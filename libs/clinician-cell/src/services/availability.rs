// libs/clinician-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveTime;
use tracing::{debug, info};
use uuid::Uuid;

use identity_cell::UserService;
use shared_utils::Clock;

use crate::error::ClinicianError;
use crate::models::{AvailabilityWindow, UpsertAvailabilityRequest};
use crate::repository::AvailabilityRepository;

/// True when one of the clinician's available windows on `weekday` contains `[start, end]`.
/// Dates and time-off are not consulted.
pub fn is_within_availability(
    windows: &[AvailabilityWindow],
    clinician_id: Uuid,
    weekday: u8,
    start: NaiveTime,
    end: NaiveTime,
) -> bool {
    windows
        .iter()
        .filter(|w| w.clinician_id == clinician_id && w.weekday == weekday)
        .any(|w| w.covers(start, end))
}

fn check_weekday(weekday: u8) -> Result<(), ClinicianError> {
    if weekday > 6 {
        return Err(ClinicianError::validation(
            "weekday",
            format!("{} is not between 0 (Sunday) and 6 (Saturday)", weekday),
        ));
    }
    Ok(())
}

pub struct AvailabilityService {
    repository: Arc<dyn AvailabilityRepository>,
    users: Arc<UserService>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        repository: Arc<dyn AvailabilityRepository>,
        users: Arc<UserService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, users, clock }
    }

    pub async fn list_availability(
        &self,
        clinician_id: Uuid,
        weekday: Option<u8>,
    ) -> Result<Vec<AvailabilityWindow>, ClinicianError> {
        if let Some(day) = weekday {
            check_weekday(day)?;
        }
        Ok(self.repository.list(clinician_id, weekday).await?)
    }

    /// Create the window or update the one with the same weekday and bounds. Existing
    /// appointments are never touched.
    pub async fn upsert_availability(
        &self,
        clinician_id: Uuid,
        request: UpsertAvailabilityRequest,
    ) -> Result<AvailabilityWindow, ClinicianError> {
        debug!(
            "Upserting availability for clinician {} on weekday {}",
            clinician_id, request.weekday
        );

        check_weekday(request.weekday)?;
        if request.end_time <= request.start_time {
            return Err(ClinicianError::validation("end_time", "must be after start_time"));
        }
        self.users.require_clinician(clinician_id).await?;

        let now = self.clock.now();
        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            clinician_id,
            weekday: request.weekday,
            start_time: request.start_time,
            end_time: request.end_time,
            is_recurring: request.is_recurring,
            is_available: request.is_available,
            override_reason: request.override_reason,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.upsert(window).await?;
        info!(
            "Availability {} for clinician {} set to available={}",
            stored.id, clinician_id, stored.is_available
        );
        Ok(stored)
    }

    pub async fn delete_availability(&self, clinician_id: Uuid, window_id: Uuid) -> Result<(), ClinicianError> {
        if !self.repository.delete(clinician_id, window_id).await? {
            return Err(ClinicianError::not_found("availability window", window_id));
        }
        info!("Deleted availability {} of clinician {}", window_id, clinician_id);
        Ok(())
    }
}
