use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::Role;

use crate::error::IdentityError;
use crate::models::{CreateUserRequest, HealthcareUser, RoleProfile, UserWithProfile};
use crate::repository::UserDirectory;

fn is_valid_phone(phone: &str) -> bool {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE
        .get_or_init(|| Regex::new(r"^\+?1?\d{9,15}$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(phone))
}

pub struct UserService {
    directory: Arc<dyn UserDirectory>,
}

impl UserService {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Create a user together with the profile its role requires.
    pub async fn create_user_with_profile(
        &self,
        request: CreateUserRequest,
    ) -> Result<UserWithProfile, IdentityError> {
        debug!("Creating {} user: {}", request.role, request.email);

        let email = request.email.trim().to_ascii_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(IdentityError::validation("email", "must be an email address"));
        }
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(IdentityError::validation("name", "first and last name are required"));
        }
        if let Some(phone) = &request.phone {
            if !is_valid_phone(phone) {
                return Err(IdentityError::validation(
                    "phone",
                    "international format: +[country code][number], 9 to 15 digits",
                ));
            }
        }
        check_profile_matches_role(request.role, request.profile.as_ref())?;

        if let Some(RoleProfile::Clinician(profile)) = &request.profile {
            if profile.license_number.trim().is_empty() {
                return Err(IdentityError::validation("license_number", "must not be empty"));
            }
        }

        let now = Utc::now();
        let user = HealthcareUser {
            id: Uuid::new_v4(),
            email,
            phone: request.phone,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            role: request.role,
            status: request.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .directory
            .create_user_with_profile(user, request.profile.clone())
            .await
            .map_err(|e| {
                warn!("User creation rejected by storage: {}", e);
                IdentityError::from(e)
            })?;

        info!("Created {} user {}", created.role, created.id);
        Ok(UserWithProfile {
            user: created,
            profile: request.profile,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserWithProfile, IdentityError> {
        let user = self
            .directory
            .find_user(id)
            .await?
            .ok_or(IdentityError::NotFound(id))?;
        let profile = self.directory.find_profile(&user).await?;
        Ok(UserWithProfile { user, profile })
    }

    async fn require_role(&self, id: Uuid, expected: Role) -> Result<HealthcareUser, IdentityError> {
        let user = self
            .directory
            .find_user(id)
            .await?
            .ok_or(IdentityError::NotFound(id))?;
        if user.role != expected {
            return Err(IdentityError::WrongRole { id, expected });
        }
        Ok(user)
    }

    /// The patient side of a booking only has to exist.
    pub async fn require_patient(&self, id: Uuid) -> Result<HealthcareUser, IdentityError> {
        self.require_role(id, Role::Patient).await
    }

    /// Any clinician, whatever their status; schedules may be prepared before activation.
    pub async fn require_clinician(&self, id: Uuid) -> Result<HealthcareUser, IdentityError> {
        self.require_role(id, Role::Clinician).await
    }

    pub async fn require_active_clinician(&self, id: Uuid) -> Result<HealthcareUser, IdentityError> {
        let user = self.require_role(id, Role::Clinician).await?;
        if !user.is_active() {
            return Err(IdentityError::Inactive(id));
        }
        Ok(user)
    }
}

fn check_profile_matches_role(role: Role, profile: Option<&RoleProfile>) -> Result<(), IdentityError> {
    match (role, profile) {
        (Role::Clinician, Some(RoleProfile::Clinician(_))) | (Role::Patient, Some(RoleProfile::Patient(_))) => Ok(()),
        (Role::Clinician, _) => Err(IdentityError::validation("profile", "clinicians require a clinician profile")),
        (Role::Patient, _) => Err(IdentityError::validation("profile", "patients require a patient profile")),
        (other, Some(profile)) => Err(IdentityError::validation(
            "profile",
            format!("{} users cannot carry a {} profile", other, profile.role()),
        )),
        (_, None) => Ok(()),
    }
}
