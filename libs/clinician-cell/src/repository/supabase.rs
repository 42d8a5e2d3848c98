use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_database::{RepositoryError, SupabaseClient};

use crate::models::{AvailabilityWindow, Specialization, SpecializationFilter, SpecializationStatus, TimeOff};

use super::{AvailabilityRepository, SpecializationRepository, TimeOffRepository};

fn encode_time(at: DateTime<Utc>) -> String {
    urlencoding::encode(&at.to_rfc3339()).into_owned()
}

fn first_or_not_found<T>(rows: Vec<T>) -> Result<T, RepositoryError> {
    rows.into_iter().next().ok_or(RepositoryError::NotFound)
}

pub struct SupabaseAvailabilityRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAvailabilityRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AvailabilityRepository for SupabaseAvailabilityRepository {
    async fn list(&self, clinician_id: Uuid, weekday: Option<u8>) -> Result<Vec<AvailabilityWindow>, RepositoryError> {
        let mut path = format!("/rest/v1/availability_windows?clinician_id=eq.{}", clinician_id);
        if let Some(day) = weekday {
            path.push_str(&format!("&weekday=eq.{}", day));
        }
        path.push_str("&order=weekday.asc,start_time.asc");

        let rows: Vec<AvailabilityWindow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn upsert(&self, window: AvailabilityWindow) -> Result<AvailabilityWindow, RepositoryError> {
        debug!("Upserting availability window for clinician {}", window.clinician_id);

        // id and created_at are left to the database so a merge keeps the stored ones.
        let body = json!({
            "clinician_id": window.clinician_id,
            "weekday": window.weekday,
            "start_time": window.start_time.format("%H:%M:%S").to_string(),
            "end_time": window.end_time.format("%H:%M:%S").to_string(),
            "is_recurring": window.is_recurring,
            "is_available": window.is_available,
            "override_reason": window.override_reason,
            "updated_at": window.updated_at.to_rfc3339(),
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let rows: Vec<AvailabilityWindow> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/availability_windows?on_conflict=clinician_id,weekday,start_time,end_time",
                None,
                Some(body),
                Some(headers),
            )
            .await?;
        first_or_not_found(rows)
    }

    async fn delete(&self, clinician_id: Uuid, window_id: Uuid) -> Result<bool, RepositoryError> {
        let path = format!(
            "/rest/v1/availability_windows?id=eq.{}&clinician_id=eq.{}",
            window_id, clinician_id
        );
        let rows: Vec<AvailabilityWindow> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, None, Some(SupabaseClient::return_representation()))
            .await?;
        Ok(!rows.is_empty())
    }
}

pub struct SupabaseTimeOffRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseTimeOffRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl TimeOffRepository for SupabaseTimeOffRepository {
    async fn insert(&self, time_off: TimeOff) -> Result<TimeOff, RepositoryError> {
        let body = serde_json::to_value(&time_off).map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let rows: Vec<TimeOff> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/time_off",
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        first_or_not_found(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<TimeOff>, RepositoryError> {
        let path = format!("/rest/v1/time_off?id=eq.{}&limit=1", id);
        let rows: Vec<TimeOff> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn approve(
        &self,
        id: Uuid,
        approved_by: Uuid,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<TimeOff>, RepositoryError> {
        let path = format!("/rest/v1/time_off?id=eq.{}", id);
        let body = json!({
            "is_approved": true,
            "approved_by": approved_by,
            "approved_at": approved_at.to_rfc3339(),
            "updated_at": approved_at.to_rfc3339(),
        });
        let rows: Vec<TimeOff> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, None, Some(body), Some(SupabaseClient::return_representation()))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, clinician_id: Uuid, ends_after: Option<DateTime<Utc>>) -> Result<Vec<TimeOff>, RepositoryError> {
        let mut path = format!("/rest/v1/time_off?clinician_id=eq.{}", clinician_id);
        if let Some(at) = ends_after {
            path.push_str(&format!("&end_datetime=gt.{}", encode_time(at)));
        }
        path.push_str("&order=start_datetime.asc");

        let rows: Vec<TimeOff> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn find_approved_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, RepositoryError> {
        let path = format!(
            "/rest/v1/time_off?clinician_id=eq.{}&is_approved=is.true&start_datetime=lt.{}&end_datetime=gt.{}",
            clinician_id,
            encode_time(end),
            encode_time(start),
        );
        let rows: Vec<TimeOff> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }
}

pub struct SupabaseSpecializationRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseSpecializationRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl SpecializationRepository for SupabaseSpecializationRepository {
    async fn insert(&self, specialization: Specialization) -> Result<Specialization, RepositoryError> {
        let body = serde_json::to_value(&specialization).map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let rows: Vec<Specialization> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/specializations",
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        first_or_not_found(rows)
    }

    async fn list(&self, filter: &SpecializationFilter) -> Result<Vec<Specialization>, RepositoryError> {
        let mut path = String::from("/rest/v1/specializations?order=name.asc");
        if !filter.include_inactive {
            path.push_str("&status=eq.active");
        }
        if let Some(department) = &filter.department {
            path.push_str(&format!("&department=eq.{}", urlencoding::encode(department)));
        }
        if let Some(flag) = filter.is_surgical {
            path.push_str(&format!("&is_surgical=is.{}", flag));
        }
        if let Some(flag) = filter.is_primary_care {
            path.push_str(&format!("&is_primary_care=is.{}", flag));
        }

        let rows: Vec<Specialization> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Specialization>, RepositoryError> {
        let path = format!("/rest/v1/specializations?slug=eq.{}&limit=1", urlencoding::encode(slug));
        let rows: Vec<Specialization> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SpecializationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Specialization>, RepositoryError> {
        let path = format!("/rest/v1/specializations?id=eq.{}", id);
        let body = json!({ "status": status, "updated_at": updated_at.to_rfc3339() });
        let rows: Vec<Specialization> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, None, Some(body), Some(SupabaseClient::return_representation()))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn link_clinician(&self, clinician_id: Uuid, specialization_id: Uuid) -> Result<(), RepositoryError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("resolution=ignore-duplicates"));

        let body = json!({ "clinician_id": clinician_id, "specialization_id": specialization_id });
        self.supabase
            .execute(
                Method::POST,
                "/rest/v1/clinician_specializations?on_conflict=clinician_id,specialization_id",
                None,
                Some(body),
                Some(headers),
            )
            .await?;
        Ok(())
    }

    async fn list_for_clinician(&self, clinician_id: Uuid) -> Result<Vec<Specialization>, RepositoryError> {
        let path = format!(
            "/rest/v1/specializations?select=*,clinician_specializations!inner(clinician_id)&clinician_specializations.clinician_id=eq.{}&order=name.asc",
            clinician_id
        );
        let rows: Vec<Specialization> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }
}
