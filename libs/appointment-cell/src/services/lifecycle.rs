// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentStatus};

#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// All statuses reachable in one step from `current`.
    pub fn get_valid_transitions(&self, current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Scheduled => &[AppointmentStatus::InProgress, AppointmentStatus::Cancelled],
            AppointmentStatus::InProgress => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            // Terminal states
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn validate_status_transition(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", from, to);

        if !self.get_valid_transitions(from).contains(&to) {
            warn!("Invalid status transition for {}: {} -> {}", appointment_id, from, to);
            return Err(AppointmentError::InvalidTransition { appointment_id, from, to });
        }
        Ok(())
    }

    /// The appointment after moving to `target`. The input is left untouched so a failed
    /// write has nothing to undo.
    pub fn apply(
        &self,
        appointment: &Appointment,
        target: AppointmentStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        self.validate_status_transition(appointment.id, appointment.status, target)?;

        let mut next = appointment.clone();
        next.status = target;
        next.updated_at = now;
        if target == AppointmentStatus::Cancelled {
            next.cancellation_reason = reason.filter(|r| !r.trim().is_empty());
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};

    fn appointment(status: AppointmentStatus) -> Appointment {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            clinician_id: Some(Uuid::new_v4()),
            scheduled_start: start,
            scheduled_end: start + Duration::minutes(30),
            status,
            priority: 3,
            chief_complaint: None,
            notes: None,
            is_admin_override: false,
            cancellation_reason: None,
            version: 1,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn forward_transitions_are_allowed() {
        let lifecycle = AppointmentLifecycle::new();
        let id = Uuid::new_v4();
        for (from, to) in [
            (AppointmentStatus::Scheduled, AppointmentStatus::InProgress),
            (AppointmentStatus::Scheduled, AppointmentStatus::Cancelled),
            (AppointmentStatus::InProgress, AppointmentStatus::Completed),
            (AppointmentStatus::InProgress, AppointmentStatus::Cancelled),
        ] {
            assert!(lifecycle.validate_status_transition(id, from, to).is_ok(), "{} -> {}", from, to);
        }
    }

    #[test]
    fn terminal_and_same_state_transitions_are_rejected() {
        let lifecycle = AppointmentLifecycle::new();
        let id = Uuid::new_v4();

        assert_matches!(
            lifecycle.validate_status_transition(id, AppointmentStatus::Completed, AppointmentStatus::Cancelled),
            Err(AppointmentError::InvalidTransition { from: AppointmentStatus::Completed, .. })
        );
        assert!(lifecycle
            .validate_status_transition(id, AppointmentStatus::Scheduled, AppointmentStatus::Scheduled)
            .is_err());
        assert!(lifecycle
            .validate_status_transition(id, AppointmentStatus::Scheduled, AppointmentStatus::Completed)
            .is_err());
    }

    #[test]
    fn apply_records_cancellation_reason_and_keeps_input() {
        let lifecycle = AppointmentLifecycle::new();
        let original = appointment(AppointmentStatus::Scheduled);
        let now = original.created_at + Duration::hours(1);

        let cancelled = lifecycle
            .apply(&original, AppointmentStatus::Cancelled, Some("patient ill".to_string()), now)
            .unwrap();

        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("patient ill"));
        assert_eq!(cancelled.updated_at, now);
        assert_eq!(original.status, AppointmentStatus::Scheduled);
    }
}
