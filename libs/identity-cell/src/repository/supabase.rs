use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_database::{RepositoryError, SupabaseClient};
use shared_models::auth::Role;

use crate::models::{ClinicianProfile, HealthcareUser, PatientProfile, RoleProfile};

use super::UserDirectory;

pub struct SupabaseUserDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseUserDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl UserDirectory for SupabaseUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<HealthcareUser>, RepositoryError> {
        let path = format!("/rest/v1/healthcare_users?id=eq.{}&limit=1", id);
        let rows: Vec<HealthcareUser> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_profile(&self, user: &HealthcareUser) -> Result<Option<RoleProfile>, RepositoryError> {
        match user.role {
            Role::Clinician => {
                let path = format!("/rest/v1/clinician_profiles?user_id=eq.{}&limit=1", user.id);
                let rows: Vec<ClinicianProfile> = self.supabase.request(Method::GET, &path, None, None).await?;
                Ok(rows.into_iter().next().map(RoleProfile::Clinician))
            }
            Role::Patient => {
                let path = format!("/rest/v1/patient_profiles?user_id=eq.{}&limit=1", user.id);
                let rows: Vec<PatientProfile> = self.supabase.request(Method::GET, &path, None, None).await?;
                Ok(rows.into_iter().next().map(RoleProfile::Patient))
            }
            _ => Ok(None),
        }
    }

    async fn create_user_with_profile(
        &self,
        user: HealthcareUser,
        profile: Option<RoleProfile>,
    ) -> Result<HealthcareUser, RepositoryError> {
        debug!("Creating user {} with {} profile via rpc", user.id, user.role);
        let created: HealthcareUser = self
            .supabase
            .rpc(
                "create_user_with_profile",
                json!({ "p_user": user, "p_profile": profile }),
            )
            .await?;
        Ok(created)
    }
}
