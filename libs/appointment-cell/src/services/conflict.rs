// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use shared_database::RepositoryError;

use crate::error::AppointmentError;
use crate::models::Appointment;
use crate::repository::{AppointmentRepository, NO_OVERLAP_CONSTRAINT};
use crate::services::locking::ScheduleLocks;

/// A write to a clinician's schedule.
#[derive(Debug, Clone)]
pub enum Reservation {
    New(Appointment),
    /// Reschedule or reassignment. The appointment's own id is excluded from the overlap query.
    Move {
        appointment: Appointment,
        expected_version: i64,
    },
    /// Status-only change; the interval is unchanged so no overlap query is needed.
    Status {
        appointment: Appointment,
        expected_version: i64,
    },
}

impl Reservation {
    fn appointment(&self) -> &Appointment {
        match self {
            Reservation::New(appointment)
            | Reservation::Move { appointment, .. }
            | Reservation::Status { appointment, .. } => appointment,
        }
    }
}

/// Serializes every write to a clinician's schedule and guarantees that no two active
/// appointments of the clinician overlap.
pub struct ConflictResolver {
    repository: Arc<dyn AppointmentRepository>,
    locks: Arc<ScheduleLocks>,
}

impl ConflictResolver {
    pub fn new(repository: Arc<dyn AppointmentRepository>, locks: Arc<ScheduleLocks>) -> Self {
        Self { repository, locks }
    }

    pub async fn reserve(&self, reservation: Reservation) -> Result<Appointment, AppointmentError> {
        let appointment_id = reservation.appointment().id;
        let clinician_id = reservation.appointment().clinician_id;
        let _guard = self.locks.acquire(clinician_id).await?;

        if !matches!(reservation, Reservation::Status { .. }) {
            self.check_overlap(reservation.appointment()).await?;
        }

        let written = match reservation {
            Reservation::New(appointment) => self.repository.insert(appointment).await,
            Reservation::Move { appointment, expected_version }
            | Reservation::Status { appointment, expected_version } => {
                self.repository.update(appointment, expected_version).await
            }
        };

        match written {
            Ok(appointment) => {
                info!("Appointment {} written at version {}", appointment.id, appointment.version);
                Ok(appointment)
            }
            Err(RepositoryError::Conflict { constraint, conflicting_id }) => {
                warn!("Storage rejected appointment on constraint {}", constraint);
                match clinician_id {
                    Some(clinician_id) if constraint == NO_OVERLAP_CONSTRAINT => {
                        Err(AppointmentError::SlotConflict {
                            clinician_id,
                            conflicting_appointment_id: conflicting_id,
                        })
                    }
                    _ => Err(AppointmentError::Repository(format!("constraint {} violated", constraint))),
                }
            }
            Err(RepositoryError::NotFound) => Err(AppointmentError::NotFound {
                entity: "appointment",
                id: appointment_id,
            }),
            Err(other) => Err(other.into()),
        }
    }

    async fn check_overlap(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let clinician_id = match appointment.clinician_id {
            Some(id) if appointment.occupies_time() => id,
            _ => return Ok(()),
        };

        let overlapping = self
            .repository
            .find_overlapping(clinician_id, appointment.scheduled_start, appointment.scheduled_end, Some(appointment.id))
            .await?;

        if let Some(existing) = overlapping.first() {
            warn!(
                "Appointment {} overlaps appointment {} of clinician {}",
                appointment.id, existing.id, clinician_id
            );
            return Err(AppointmentError::SlotConflict {
                clinician_id,
                conflicting_appointment_id: Some(existing.id),
            });
        }

        debug!("No overlap for clinician {} in {} - {}", clinician_id, appointment.scheduled_start, appointment.scheduled_end);
        Ok(())
    }
}
