// libs/appointment-cell/src/services/medical_record.rs
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_utils::Clock;

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentStatus, CreateMedicalRecordRequest, MedicalRecord};
use crate::repository::{AppointmentRepository, MedicalRecordRepository};

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub struct MedicalRecordService {
    repository: Arc<dyn MedicalRecordRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
}

impl MedicalRecordService {
    pub fn new(
        repository: Arc<dyn MedicalRecordRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            appointments,
            clock,
        }
    }

    async fn appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound {
                entity: "appointment",
                id: appointment_id,
            })
    }

    /// The record is attributed to the appointment's patient and assigned clinician.
    pub async fn record_for_appointment(
        &self,
        appointment_id: Uuid,
        request: CreateMedicalRecordRequest,
    ) -> Result<MedicalRecord, AppointmentError> {
        debug!("Recording notes for appointment {}", appointment_id);

        let appointment = self.appointment(appointment_id).await?;
        let clinician_id = appointment
            .clinician_id
            .ok_or_else(|| AppointmentError::validation("clinician_id", "appointment has no assigned clinician"))?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppointmentError::validation(
                "status",
                "cancelled appointments cannot carry medical records",
            ));
        }

        let diagnosis = clean(request.diagnosis);
        let treatment = clean(request.treatment);
        let medication = clean(request.medication);
        let follow_up = clean(request.follow_up);
        if diagnosis.is_none() && treatment.is_none() && medication.is_none() && follow_up.is_none() {
            return Err(AppointmentError::validation("diagnosis", "record has no content"));
        }

        let now = self.clock.now();
        let record = MedicalRecord {
            id: Uuid::new_v4(),
            appointment_id,
            patient_id: appointment.patient_id,
            clinician_id,
            diagnosis,
            treatment,
            medication,
            follow_up,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record).await?;
        info!("Medical record {} stored for appointment {}", stored.id, appointment_id);
        Ok(stored)
    }

    pub async fn list_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<MedicalRecord>, AppointmentError> {
        self.appointment(appointment_id).await?;
        Ok(self.repository.list_for_appointment(appointment_id).await?)
    }
}
