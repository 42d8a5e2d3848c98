// libs/appointment-cell/src/services/attachment.rs
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_utils::Clock;

use crate::error::AppointmentError;
use crate::models::{Attachment, AttachmentOwner, CreateAttachmentRequest};
use crate::repository::{AppointmentRepository, AttachmentRepository};

pub struct AttachmentService {
    repository: Arc<dyn AttachmentRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
}

impl AttachmentService {
    pub fn new(
        repository: Arc<dyn AttachmentRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            appointments,
            clock,
        }
    }

    pub async fn attach_to_appointment(
        &self,
        appointment_id: Uuid,
        uploaded_by: Uuid,
        request: CreateAttachmentRequest,
    ) -> Result<Attachment, AppointmentError> {
        debug!("Attaching {:?} to appointment {}", request.kind, appointment_id);

        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppointmentError::validation("title", "must not be empty"));
        }
        let storage_path = request.storage_path.trim();
        if storage_path.is_empty() {
            return Err(AppointmentError::validation("storage_path", "must not be empty"));
        }

        self.appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound {
                entity: "appointment",
                id: appointment_id,
            })?;

        let attachment = Attachment {
            id: Uuid::new_v4(),
            owner: AttachmentOwner::Appointment(appointment_id),
            kind: request.kind,
            title: title.to_string(),
            storage_path: storage_path.to_string(),
            content_type: request.content_type,
            uploaded_by,
            created_at: self.clock.now(),
        };

        let stored = self.repository.insert(attachment).await?;
        info!("Attachment {} stored for appointment {}", stored.id, appointment_id);
        Ok(stored)
    }

    pub async fn list_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<Attachment>, AppointmentError> {
        Ok(self
            .repository
            .list_for_owner(AttachmentOwner::Appointment(appointment_id))
            .await?)
    }
}
