// libs/appointment-cell/src/services/notification.rs
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::Appointment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentEvent {
    Confirmed,
    Rescheduled,
    Cancelled,
}

impl AppointmentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentEvent::Confirmed => "appointment.confirmed",
            AppointmentEvent::Rescheduled => "appointment.rescheduled",
            AppointmentEvent::Cancelled => "appointment.cancelled",
        }
    }
}

impl fmt::Display for AppointmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification endpoint answered {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait AppointmentNotifier: Send + Sync {
    async fn notify(&self, event: AppointmentEvent, appointment: &Appointment) -> Result<(), NotificationError>;
}

/// Writes events to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl AppointmentNotifier for LogNotifier {
    async fn notify(&self, event: AppointmentEvent, appointment: &Appointment) -> Result<(), NotificationError> {
        info!(
            "{} for appointment {} (patient {}, clinician {:?})",
            event, appointment.id, appointment.patient_id, appointment.clinician_id
        );
        Ok(())
    }
}

/// Posts each event as JSON to a configured URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl AppointmentNotifier for WebhookNotifier {
    async fn notify(&self, event: AppointmentEvent, appointment: &Appointment) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "event": event.as_str(),
                "appointment": appointment,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Fire-and-forget delivery. A failed notification is logged and never reaches the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn AppointmentNotifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn AppointmentNotifier>) -> Self {
        Self { notifier }
    }

    pub fn dispatch(&self, event: AppointmentEvent, appointment: Appointment) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(event, &appointment).await {
                warn!("Failed to deliver {} for appointment {}: {}", event, appointment.id, e);
            }
        })
    }
}
