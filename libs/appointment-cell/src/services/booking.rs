// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use clinician_cell::{AvailabilityService, TimeOffService};
use identity_cell::UserService;
use shared_config::SchedulingConfig;
use shared_utils::Clock;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentQuery, AppointmentStatus, BookAppointmentRequest, BulkTransitionReport,
    RejectedTransition, RescheduleAppointmentRequest, DEFAULT_PRIORITY,
};
use crate::repository::AppointmentRepository;
use crate::services::conflict::{ConflictResolver, Reservation};
use crate::services::lifecycle::AppointmentLifecycle;
use crate::services::locking::ScheduleLocks;
use crate::services::notification::{AppointmentEvent, AppointmentNotifier, NotificationDispatcher};
use crate::services::validator::{SlotRequest, SlotValidator};

/// Entry point for every change to an appointment.
pub struct BookingService {
    appointments: Arc<dyn AppointmentRepository>,
    users: Arc<UserService>,
    validator: SlotValidator,
    resolver: ConflictResolver,
    locks: Arc<ScheduleLocks>,
    lifecycle: AppointmentLifecycle,
    notifications: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        users: Arc<UserService>,
        availability: Arc<AvailabilityService>,
        time_off: Arc<TimeOffService>,
        notifier: Arc<dyn AppointmentNotifier>,
        clock: Arc<dyn Clock>,
        scheduling: &SchedulingConfig,
    ) -> Self {
        let locks = Arc::new(ScheduleLocks::new(scheduling.lock_timeout()));
        let validator = SlotValidator::new(availability, time_off, Arc::clone(&clock), scheduling.clinic_offset());
        let resolver = ConflictResolver::new(Arc::clone(&appointments), Arc::clone(&locks));

        Self {
            appointments,
            users,
            validator,
            resolver,
            locks,
            lifecycle: AppointmentLifecycle::new(),
            notifications: NotificationDispatcher::new(notifier),
            clock,
        }
    }

    /// The per-clinician schedule locks every write goes through.
    pub fn schedule_locks(&self) -> Arc<ScheduleLocks> {
        Arc::clone(&self.locks)
    }

    #[instrument(skip(self, request), fields(patient_id = %request.patient_id))]
    pub async fn create_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment with clinician {:?}", request.clinician_id);

        let priority = request.priority.unwrap_or(DEFAULT_PRIORITY);
        if !(1..=5).contains(&priority) {
            return Err(AppointmentError::validation(
                "priority",
                format!("{} is not between 1 and 5", priority),
            ));
        }

        self.users
            .require_patient(request.patient_id)
            .await
            .map_err(|e| AppointmentError::participant("patient_id", e))?;
        if let Some(clinician_id) = request.clinician_id {
            self.users
                .require_active_clinician(clinician_id)
                .await
                .map_err(|e| AppointmentError::participant("clinician_id", e))?;
        }

        let slot = self
            .validator
            .validate(SlotRequest {
                clinician_id: request.clinician_id,
                start: request.scheduled_start,
                end: request.scheduled_end,
                is_admin_override: request.is_admin_override,
            })
            .await?;

        let now = self.clock.now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            clinician_id: request.clinician_id,
            scheduled_start: slot.start,
            scheduled_end: slot.end,
            status: AppointmentStatus::Scheduled,
            priority,
            chief_complaint: request.chief_complaint,
            notes: request.notes,
            is_admin_override: request.is_admin_override,
            cancellation_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let booked = self.resolver.reserve(Reservation::New(appointment)).await?;
        info!("Appointment {} booked for patient {}", booked.id, booked.patient_id);

        self.notifications.dispatch(AppointmentEvent::Confirmed, booked.clone());
        Ok(booked)
    }

    #[instrument(skip(self, request))]
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        if current.status != AppointmentStatus::Scheduled {
            warn!("Cannot reschedule appointment {} in status {}", appointment_id, current.status);
            return Err(AppointmentError::InvalidTransition {
                appointment_id,
                from: current.status,
                to: AppointmentStatus::Scheduled,
            });
        }

        let slot = self
            .validator
            .validate(SlotRequest {
                clinician_id: current.clinician_id,
                start: request.scheduled_start,
                end: request.scheduled_end,
                is_admin_override: request.is_admin_override,
            })
            .await?;

        let mut moved = current.clone();
        moved.scheduled_start = slot.start;
        moved.scheduled_end = slot.end;
        moved.is_admin_override = request.is_admin_override;
        moved.updated_at = self.clock.now();

        let rescheduled = self
            .resolver
            .reserve(Reservation::Move {
                appointment: moved,
                expected_version: current.version,
            })
            .await?;
        info!("Appointment {} rescheduled to {}", rescheduled.id, rescheduled.scheduled_start);

        self.notifications.dispatch(AppointmentEvent::Rescheduled, rescheduled.clone());
        Ok(rescheduled)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        self.transition_status(appointment_id, AppointmentStatus::Cancelled, reason).await
    }

    /// Move the appointment through the lifecycle. A rejected transition leaves the stored row as it was.
    #[instrument(skip(self, reason))]
    pub async fn transition_status(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        let next = self.lifecycle.apply(&current, target, reason, self.clock.now())?;

        let updated = self
            .resolver
            .reserve(Reservation::Status {
                appointment: next,
                expected_version: current.version,
            })
            .await?;
        info!("Appointment {} moved from {} to {}", appointment_id, current.status, updated.status);

        if updated.status == AppointmentStatus::Cancelled {
            self.notifications.dispatch(AppointmentEvent::Cancelled, updated.clone());
        }
        Ok(updated)
    }

    /// Applies the transition row by row; one rejection does not stop the others.
    pub async fn bulk_transition(&self, appointment_ids: &[Uuid], target: AppointmentStatus) -> BulkTransitionReport {
        let mut report = BulkTransitionReport::default();

        for &appointment_id in appointment_ids {
            match self.transition_status(appointment_id, target, None).await {
                Ok(appointment) => report.changed.push(appointment),
                Err(e) => report.rejected.push(RejectedTransition {
                    appointment_id,
                    kind: e.kind().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            "Bulk transition to {}: {} changed, {} rejected",
            target,
            report.changed.len(),
            report.rejected.len()
        );
        report
    }

    /// Give an unassigned appointment to a clinician, subject to the same slot rules as a booking.
    #[instrument(skip(self))]
    pub async fn assign_clinician(&self, appointment_id: Uuid, clinician_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        if current.clinician_id.is_some() {
            return Err(AppointmentError::validation(
                "clinician_id",
                "appointment already has a clinician; reschedule or cancel it instead",
            ));
        }
        if current.status != AppointmentStatus::Scheduled {
            return Err(AppointmentError::InvalidTransition {
                appointment_id,
                from: current.status,
                to: AppointmentStatus::Scheduled,
            });
        }

        self.users
            .require_active_clinician(clinician_id)
            .await
            .map_err(|e| AppointmentError::participant("clinician_id", e))?;

        self.validator
            .validate(SlotRequest {
                clinician_id: Some(clinician_id),
                start: current.scheduled_start,
                end: current.scheduled_end,
                is_admin_override: current.is_admin_override,
            })
            .await?;

        let mut assigned = current.clone();
        assigned.clinician_id = Some(clinician_id);
        assigned.updated_at = self.clock.now();

        let updated = self
            .resolver
            .reserve(Reservation::Move {
                appointment: assigned,
                expected_version: current.version,
            })
            .await?;
        info!("Appointment {} assigned to clinician {}", appointment_id, clinician_id);
        Ok(updated)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound {
                entity: "appointment",
                id: appointment_id,
            })
    }

    pub async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.appointments.list(query).await?)
    }
}
