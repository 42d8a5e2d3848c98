#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::repository::{
    AppointmentRepository, InMemoryAppointmentRepository, InMemoryAttachmentRepository,
    InMemoryMedicalRecordRepository,
};
use appointment_cell::{
    AppointmentNotifier, AppointmentState, AttachmentService, BookAppointmentRequest, BookingService, LogNotifier,
    MedicalRecordService,
};
use clinician_cell::repository::{InMemoryAvailabilityRepository, InMemoryTimeOffRepository};
use clinician_cell::{AvailabilityService, TimeOffRequest, TimeOffService, UpsertAvailabilityRequest};
use identity_cell::{
    ClinicianProfile, CreateUserRequest, InMemoryUserDirectory, PatientProfile, Role, RoleProfile, UserService,
    UserStatus,
};
use shared_config::SchedulingConfig;
use shared_utils::FixedClock;

/// 08:00 UTC on Saturday 2024-06-01.
pub fn start_of_tests() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

/// An instant in June 2024. The 3rd and 10th are Mondays.
pub fn june(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap()
}

pub fn booking(
    patient_id: Uuid,
    clinician_id: Option<Uuid>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id,
        clinician_id,
        scheduled_start: start,
        scheduled_end: end,
        chief_complaint: Some("Persistent cough".to_string()),
        notes: None,
        priority: None,
        is_admin_override: false,
    }
}

pub struct Fixture {
    pub users: Arc<UserService>,
    pub clock: Arc<FixedClock>,
    pub availability: Arc<AvailabilityService>,
    pub time_off: Arc<TimeOffService>,
    pub store: Arc<InMemoryAppointmentRepository>,
    pub booking: Arc<BookingService>,
    pub state: Arc<AppointmentState>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(LogNotifier))
    }

    pub fn with_notifier(notifier: Arc<dyn AppointmentNotifier>) -> Self {
        let store = Arc::new(InMemoryAppointmentRepository::new());
        Self::build(store.clone(), store, notifier, 200)
    }

    /// Bookings go through `repository`; `store` is what the assertions inspect.
    pub fn build(
        store: Arc<InMemoryAppointmentRepository>,
        repository: Arc<dyn AppointmentRepository>,
        notifier: Arc<dyn AppointmentNotifier>,
        lock_timeout_ms: u64,
    ) -> Self {
        let users = Arc::new(UserService::new(Arc::new(InMemoryUserDirectory::new())));
        let clock = Arc::new(FixedClock::new(start_of_tests()));
        let availability = Arc::new(AvailabilityService::new(
            Arc::new(InMemoryAvailabilityRepository::new()),
            users.clone(),
            clock.clone(),
        ));
        let time_off = Arc::new(TimeOffService::new(
            Arc::new(InMemoryTimeOffRepository::new()),
            users.clone(),
            clock.clone(),
        ));
        let scheduling = SchedulingConfig {
            lock_timeout_ms,
            clinic_utc_offset_minutes: 0,
        };

        let booking = Arc::new(BookingService::new(
            repository.clone(),
            users.clone(),
            availability.clone(),
            time_off.clone(),
            notifier,
            clock.clone(),
            &scheduling,
        ));
        let attachments = Arc::new(AttachmentService::new(
            Arc::new(InMemoryAttachmentRepository::new()),
            repository.clone(),
            clock.clone(),
        ));
        let records = Arc::new(MedicalRecordService::new(
            Arc::new(InMemoryMedicalRecordRepository::new()),
            repository,
            clock.clone(),
        ));
        let state = Arc::new(AppointmentState {
            booking: booking.clone(),
            attachments,
            records,
        });

        Self {
            users,
            clock,
            availability,
            time_off,
            store,
            booking,
            state,
        }
    }

    pub async fn clinician(&self, email: &str) -> Uuid {
        self.users
            .create_user_with_profile(CreateUserRequest {
                email: email.to_string(),
                phone: None,
                first_name: "Aoife".to_string(),
                last_name: "Byrne".to_string(),
                role: Role::Clinician,
                status: Some(UserStatus::Active),
                profile: Some(RoleProfile::Clinician(ClinicianProfile {
                    license_number: format!("LIC-{}", email),
                    license_jurisdiction: "IMC".to_string(),
                    accepting_new_patients: true,
                })),
            })
            .await
            .unwrap()
            .user
            .id
    }

    pub async fn patient(&self, email: &str) -> Uuid {
        self.users
            .create_user_with_profile(CreateUserRequest {
                email: email.to_string(),
                phone: Some("+353861234567".to_string()),
                first_name: "Cian".to_string(),
                last_name: "Doyle".to_string(),
                role: Role::Patient,
                status: Some(UserStatus::Active),
                profile: Some(RoleProfile::Patient(PatientProfile::default())),
            })
            .await
            .unwrap()
            .user
            .id
    }

    /// Open a weekly window, times as "HH:MM".
    pub async fn open_window(&self, clinician_id: Uuid, weekday: u8, start: &str, end: &str) {
        self.availability
            .upsert_availability(
                clinician_id,
                UpsertAvailabilityRequest {
                    weekday,
                    start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
                    end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
                    is_available: true,
                    is_recurring: true,
                    override_reason: None,
                },
            )
            .await
            .unwrap();
    }

    pub async fn approved_time_off(&self, clinician_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Uuid {
        let requested = self
            .time_off
            .request_time_off(
                clinician_id,
                TimeOffRequest {
                    start_datetime: start,
                    end_datetime: end,
                    reason: Some("Conference".to_string()),
                },
            )
            .await
            .unwrap();
        self.time_off
            .approve_time_off(requested.id, Uuid::new_v4())
            .await
            .unwrap()
            .id
    }

    /// A clinician and patient with the clinician open Monday 09:00-17:00.
    pub async fn monday_clinic(&self) -> (Uuid, Uuid) {
        let clinician = self.clinician("gp@clinic.ie").await;
        let patient = self.patient("patient@example.ie").await;
        self.open_window(clinician, 1, "09:00", "17:00").await;
        (clinician, patient)
    }
}
