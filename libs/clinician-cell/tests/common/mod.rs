#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use clinician_cell::repository::{
    InMemoryAvailabilityRepository, InMemorySpecializationRepository, InMemoryTimeOffRepository,
};
use clinician_cell::{AvailabilityService, ClinicianState, SpecializationService, TimeOffService};
use identity_cell::{
    ClinicianProfile, CreateUserRequest, InMemoryUserDirectory, Role, RoleProfile, UserService,
    UserStatus, UserWithProfile,
};
use shared_utils::FixedClock;

pub struct Fixture {
    pub users: Arc<UserService>,
    pub clock: Arc<FixedClock>,
    pub state: Arc<ClinicianState>,
}

impl Fixture {
    pub fn new() -> Self {
        let users = Arc::new(UserService::new(Arc::new(InMemoryUserDirectory::new())));
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()));

        let state = Arc::new(ClinicianState {
            availability: Arc::new(AvailabilityService::new(
                Arc::new(InMemoryAvailabilityRepository::new()),
                users.clone(),
                clock.clone(),
            )),
            time_off: Arc::new(TimeOffService::new(
                Arc::new(InMemoryTimeOffRepository::new()),
                users.clone(),
                clock.clone(),
            )),
            specializations: Arc::new(SpecializationService::new(
                Arc::new(InMemorySpecializationRepository::new()),
                users.clone(),
                clock.clone(),
            )),
        });

        Self { users, clock, state }
    }

    pub async fn clinician(&self, email: &str) -> UserWithProfile {
        self.users
            .create_user_with_profile(CreateUserRequest {
                email: email.to_string(),
                phone: None,
                first_name: "Niamh".to_string(),
                last_name: "Walsh".to_string(),
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
    }
}
