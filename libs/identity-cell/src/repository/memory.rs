use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::RepositoryError;

use crate::models::{HealthcareUser, RoleProfile};

use super::UserDirectory;

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, (HealthcareUser, Option<RoleProfile>)>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<HealthcareUser>, RepositoryError> {
        Ok(self.users.read().await.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_profile(&self, user: &HealthcareUser) -> Result<Option<RoleProfile>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(&user.id)
            .and_then(|(_, profile)| profile.clone()))
    }

    async fn create_user_with_profile(
        &self,
        user: HealthcareUser,
        profile: Option<RoleProfile>,
    ) -> Result<HealthcareUser, RepositoryError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(RepositoryError::conflict("healthcare_users_pkey"));
        }
        if users.values().any(|(existing, _)| existing.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepositoryError::conflict("healthcare_users_email_key"));
        }
        if let Some(RoleProfile::Clinician(clinician)) = &profile {
            let taken = users.values().any(|(_, existing)| {
                matches!(existing, Some(RoleProfile::Clinician(other)) if other.license_number == clinician.license_number)
            });
            if taken {
                return Err(RepositoryError::conflict("clinician_profiles_license_number_key"));
            }
        }

        users.insert(user.id, (user.clone(), profile));
        Ok(user)
    }
}
