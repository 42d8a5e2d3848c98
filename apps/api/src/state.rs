use std::sync::Arc;

use tracing::info;

use appointment_cell::repository::{
    AppointmentRepository, AttachmentRepository, InMemoryAppointmentRepository, InMemoryAttachmentRepository,
    InMemoryMedicalRecordRepository, MedicalRecordRepository, SupabaseAppointmentRepository,
    SupabaseAttachmentRepository, SupabaseMedicalRecordRepository,
};
use appointment_cell::{
    AppointmentNotifier, AppointmentState, AttachmentService, BookingService, LogNotifier, MedicalRecordService,
    WebhookNotifier,
};
use clinician_cell::repository::{
    AvailabilityRepository, InMemoryAvailabilityRepository, InMemorySpecializationRepository,
    InMemoryTimeOffRepository, SpecializationRepository, SupabaseAvailabilityRepository,
    SupabaseSpecializationRepository, SupabaseTimeOffRepository, TimeOffRepository,
};
use clinician_cell::{AvailabilityService, ClinicianState, SpecializationService, TimeOffService};
use identity_cell::{InMemoryUserDirectory, SupabaseUserDirectory, UserDirectory, UserService};
use shared_config::{AppConfig, StorageBackend};
use shared_database::SupabaseClient;
use shared_utils::{Clock, SystemClock};

/// Every cell's services, wired once at startup.
pub struct Services {
    pub users: Arc<UserService>,
    pub clinicians: Arc<ClinicianState>,
    pub appointments: Arc<AppointmentState>,
}

struct Repositories {
    users: Arc<dyn UserDirectory>,
    availability: Arc<dyn AvailabilityRepository>,
    time_off: Arc<dyn TimeOffRepository>,
    specializations: Arc<dyn SpecializationRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    records: Arc<dyn MedicalRecordRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserDirectory::new()),
            availability: Arc::new(InMemoryAvailabilityRepository::new()),
            time_off: Arc::new(InMemoryTimeOffRepository::new()),
            specializations: Arc::new(InMemorySpecializationRepository::new()),
            appointments: Arc::new(InMemoryAppointmentRepository::new()),
            attachments: Arc::new(InMemoryAttachmentRepository::new()),
            records: Arc::new(InMemoryMedicalRecordRepository::new()),
        }
    }

    fn supabase(config: &AppConfig) -> Self {
        let client = Arc::new(SupabaseClient::new(config));
        Self {
            users: Arc::new(SupabaseUserDirectory::new(client.clone())),
            availability: Arc::new(SupabaseAvailabilityRepository::new(client.clone())),
            time_off: Arc::new(SupabaseTimeOffRepository::new(client.clone())),
            specializations: Arc::new(SupabaseSpecializationRepository::new(client.clone())),
            appointments: Arc::new(SupabaseAppointmentRepository::new(client.clone())),
            attachments: Arc::new(SupabaseAttachmentRepository::new(client.clone())),
            records: Arc::new(SupabaseMedicalRecordRepository::new(client)),
        }
    }
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Self {
        let repositories = match config.storage_backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Repositories::in_memory()
            }
            StorageBackend::Supabase => {
                info!("Using Supabase storage at {}", config.supabase_url);
                Repositories::supabase(config)
            }
        };

        let notifier: Arc<dyn AppointmentNotifier> = match &config.notification_webhook_url {
            Some(url) => {
                info!("Appointment notifications go to {}", url);
                Arc::new(WebhookNotifier::new(url.clone()))
            }
            None => Arc::new(LogNotifier),
        };

        Self::wire(config, repositories, notifier, Arc::new(SystemClock))
    }

    fn wire(
        config: &AppConfig,
        repositories: Repositories,
        notifier: Arc<dyn AppointmentNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let users = Arc::new(UserService::new(repositories.users));

        let availability = Arc::new(AvailabilityService::new(repositories.availability, users.clone(), clock.clone()));
        let time_off = Arc::new(TimeOffService::new(repositories.time_off, users.clone(), clock.clone()));
        let specializations = Arc::new(SpecializationService::new(repositories.specializations, users.clone(), clock.clone()));

        let booking = Arc::new(BookingService::new(
            repositories.appointments.clone(),
            users.clone(),
            availability.clone(),
            time_off.clone(),
            notifier,
            clock.clone(),
            &config.scheduling,
        ));
        let attachments = Arc::new(AttachmentService::new(
            repositories.attachments,
            repositories.appointments.clone(),
            clock.clone(),
        ));
        let records = Arc::new(MedicalRecordService::new(
            repositories.records,
            repositories.appointments,
            clock,
        ));

        Self {
            users,
            clinicians: Arc::new(ClinicianState {
                availability,
                time_off,
                specializations,
            }),
            appointments: Arc::new(AppointmentState {
                booking,
                attachments,
                records,
            }),
        }
    }
}
