// libs/clinician-cell/src/services/specialization.rs
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use identity_cell::UserService;
use shared_database::RepositoryError;
use shared_utils::Clock;

use crate::error::ClinicianError;
use crate::models::{
    slugify, CreateSpecializationRequest, Specialization, SpecializationFilter, SpecializationStatus,
};
use crate::repository::SpecializationRepository;

pub struct SpecializationService {
    repository: Arc<dyn SpecializationRepository>,
    users: Arc<UserService>,
    clock: Arc<dyn Clock>,
}

impl SpecializationService {
    pub fn new(
        repository: Arc<dyn SpecializationRepository>,
        users: Arc<UserService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, users, clock }
    }

    pub async fn create_specialization(
        &self,
        request: CreateSpecializationRequest,
    ) -> Result<Specialization, ClinicianError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ClinicianError::validation("name", "must not be empty"));
        }

        let now = self.clock.now();
        let specialization = Specialization {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            description: request.description,
            department: request
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_surgical: request.is_surgical,
            is_primary_care: request.is_primary_care,
            status: SpecializationStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.insert(specialization).await.map_err(|e| {
            warn!("Specialization rejected: {}", e);
            ClinicianError::from(e)
        })?;
        info!("Created specialization {} ({})", created.name, created.slug);
        Ok(created)
    }

    /// Active specializations unless the filter asks for inactive ones too.
    pub async fn list_specializations(
        &self,
        filter: SpecializationFilter,
    ) -> Result<Vec<Specialization>, ClinicianError> {
        debug!("Listing specializations with {:?}", filter);
        Ok(self.repository.list(&filter).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Specialization, ClinicianError> {
        self.repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ClinicianError::not_found("specialization", slug))
    }

    /// Distinct non-empty departments of active specializations, sorted.
    pub async fn list_departments(&self) -> Result<Vec<String>, ClinicianError> {
        let active = self.repository.list(&SpecializationFilter::default()).await?;
        let departments: BTreeSet<String> = active
            .into_iter()
            .filter_map(|s| s.department)
            .filter(|d| !d.trim().is_empty())
            .collect();
        Ok(departments.into_iter().collect())
    }

    pub async fn toggle_active(&self, slug: &str) -> Result<Specialization, ClinicianError> {
        let current = self.get_by_slug(slug).await?;
        self.set_status(current, |status| status.toggled()).await
    }

    /// Soft delete.
    pub async fn deactivate(&self, slug: &str) -> Result<Specialization, ClinicianError> {
        let current = self.get_by_slug(slug).await?;
        self.set_status(current, |_| SpecializationStatus::Inactive).await
    }

    async fn set_status(
        &self,
        current: Specialization,
        next: impl FnOnce(SpecializationStatus) -> SpecializationStatus,
    ) -> Result<Specialization, ClinicianError> {
        let status = next(current.status);
        let updated = self
            .repository
            .set_status(current.id, status, self.clock.now())
            .await?
            .ok_or_else(|| ClinicianError::not_found("specialization", &current.slug))?;
        info!("Specialization {} is now {:?}", updated.slug, updated.status);
        Ok(updated)
    }

    pub async fn assign_to_clinician(&self, clinician_id: Uuid, slug: &str) -> Result<Specialization, ClinicianError> {
        self.users.require_clinician(clinician_id).await?;

        let specialization = self.get_by_slug(slug).await?;
        if !specialization.is_active() {
            return Err(ClinicianError::validation(
                "specialization",
                format!("{} is inactive", specialization.slug),
            ));
        }

        self.repository
            .link_clinician(clinician_id, specialization.id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ClinicianError::not_found("specialization", slug),
                other => other.into(),
            })?;
        info!("Linked clinician {} to {}", clinician_id, specialization.slug);
        Ok(specialization)
    }

    pub async fn list_for_clinician(&self, clinician_id: Uuid) -> Result<Vec<Specialization>, ClinicianError> {
        Ok(self.repository.list_for_clinician(clinician_id).await?)
    }
}
