// libs/appointment-cell/src/services/validator.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use clinician_cell::{is_within_availability, AvailabilityService, TimeOffService};
use shared_utils::Clock;

use crate::error::AppointmentError;
use crate::models::TimeSlot;

/// A proposed placement of an appointment on a clinician's schedule.
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest {
    pub clinician_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_admin_override: bool,
}

/// Checks a slot against the interval rules, the clinician's weekly windows and approved
/// time-off. Overlap with other appointments is left to the conflict resolver.
pub struct SlotValidator {
    availability: Arc<AvailabilityService>,
    time_off: Arc<TimeOffService>,
    clock: Arc<dyn Clock>,
    clinic_offset: FixedOffset,
}

impl SlotValidator {
    pub fn new(
        availability: Arc<AvailabilityService>,
        time_off: Arc<TimeOffService>,
        clock: Arc<dyn Clock>,
        clinic_offset: FixedOffset,
    ) -> Self {
        Self {
            availability,
            time_off,
            clock,
            clinic_offset,
        }
    }

    pub async fn validate(&self, request: SlotRequest) -> Result<TimeSlot, AppointmentError> {
        let slot = TimeSlot::new(request.start, request.end)?;

        let now = self.clock.now();
        if slot.start <= now {
            return Err(AppointmentError::InvalidSlot { start: slot.start, now });
        }

        let clinician_id = match request.clinician_id {
            Some(id) => id,
            None => return Ok(slot),
        };

        if request.is_admin_override {
            debug!("Availability check bypassed by admin override for clinician {}", clinician_id);
        } else {
            self.check_availability(clinician_id, &slot).await?;
        }

        // Approved time-off is never bypassed.
        let blocking = self
            .time_off
            .find_approved_overlapping(clinician_id, slot.start, slot.end)
            .await?;
        if let Some(time_off) = blocking.first() {
            warn!("Slot {} - {} falls into time-off {} of clinician {}", slot.start, slot.end, time_off.id, clinician_id);
            return Err(AppointmentError::TimeOffConflict {
                clinician_id,
                time_off_id: time_off.id,
            });
        }

        Ok(slot)
    }

    async fn check_availability(&self, clinician_id: Uuid, slot: &TimeSlot) -> Result<(), AppointmentError> {
        let local_start = slot.start.with_timezone(&self.clinic_offset);
        let local_end = slot.end.with_timezone(&self.clinic_offset);
        let weekday = local_start.weekday().num_days_from_sunday() as u8;

        let outside = AppointmentError::OutsideAvailability {
            clinician_id,
            weekday,
            start_time: local_start.time(),
            end_time: local_end.time(),
        };

        // Windows never span midnight, so neither can a slot.
        if local_start.date_naive() != local_end.date_naive() {
            warn!("Slot for clinician {} crosses a clinic-local day boundary", clinician_id);
            return Err(outside);
        }

        let windows = self.availability.list_availability(clinician_id, Some(weekday)).await?;
        if !is_within_availability(&windows, clinician_id, weekday, local_start.time(), local_end.time()) {
            warn!(
                "Slot {} - {} is outside the availability of clinician {}",
                local_start, local_end, clinician_id
            );
            return Err(outside);
        }

        Ok(())
    }
}
