mod memory;
mod supabase;

use async_trait::async_trait;
use uuid::Uuid;

use shared_database::RepositoryError;

use crate::models::{HealthcareUser, RoleProfile};

pub use memory::InMemoryUserDirectory;
pub use supabase::SupabaseUserDirectory;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<HealthcareUser>, RepositoryError>;

    async fn find_profile(&self, user: &HealthcareUser) -> Result<Option<RoleProfile>, RepositoryError>;

    /// Persist the user and its role profile as one unit: either both rows exist afterwards
    /// or neither does.
    async fn create_user_with_profile(
        &self,
        user: HealthcareUser,
        profile: Option<RoleProfile>,
    ) -> Result<HealthcareUser, RepositoryError>;
}
