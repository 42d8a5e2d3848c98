use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::RepositoryError;

use crate::models::{AvailabilityWindow, Specialization, SpecializationFilter, SpecializationStatus, TimeOff};

use super::{AvailabilityRepository, SpecializationRepository, TimeOffRepository};

#[derive(Default)]
pub struct InMemoryAvailabilityRepository {
    windows: RwLock<Vec<AvailabilityWindow>>,
}

impl InMemoryAvailabilityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityRepository for InMemoryAvailabilityRepository {
    async fn list(&self, clinician_id: Uuid, weekday: Option<u8>) -> Result<Vec<AvailabilityWindow>, RepositoryError> {
        let mut found: Vec<AvailabilityWindow> = self
            .windows
            .read()
            .await
            .iter()
            .filter(|w| w.clinician_id == clinician_id && weekday.map_or(true, |day| w.weekday == day))
            .cloned()
            .collect();
        found.sort_by_key(|w| (w.weekday, w.start_time));
        Ok(found)
    }

    async fn upsert(&self, window: AvailabilityWindow) -> Result<AvailabilityWindow, RepositoryError> {
        let mut windows = self.windows.write().await;
        match windows.iter_mut().find(|existing| existing.same_slot(&window)) {
            Some(existing) => {
                existing.is_available = window.is_available;
                existing.is_recurring = window.is_recurring;
                existing.override_reason = window.override_reason;
                existing.updated_at = window.updated_at;
                Ok(existing.clone())
            }
            None => {
                windows.push(window.clone());
                Ok(window)
            }
        }
    }

    async fn delete(&self, clinician_id: Uuid, window_id: Uuid) -> Result<bool, RepositoryError> {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|w| !(w.id == window_id && w.clinician_id == clinician_id));
        Ok(windows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryTimeOffRepository {
    periods: RwLock<HashMap<Uuid, TimeOff>>,
}

impl InMemoryTimeOffRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimeOffRepository for InMemoryTimeOffRepository {
    async fn insert(&self, time_off: TimeOff) -> Result<TimeOff, RepositoryError> {
        self.periods.write().await.insert(time_off.id, time_off.clone());
        Ok(time_off)
    }

    async fn get(&self, id: Uuid) -> Result<Option<TimeOff>, RepositoryError> {
        Ok(self.periods.read().await.get(&id).cloned())
    }

    async fn approve(
        &self,
        id: Uuid,
        approved_by: Uuid,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<TimeOff>, RepositoryError> {
        let mut periods = self.periods.write().await;
        Ok(periods.get_mut(&id).map(|period| {
            period.is_approved = true;
            period.approved_by = Some(approved_by);
            period.approved_at = Some(approved_at);
            period.updated_at = approved_at;
            period.clone()
        }))
    }

    async fn list(&self, clinician_id: Uuid, ends_after: Option<DateTime<Utc>>) -> Result<Vec<TimeOff>, RepositoryError> {
        let mut found: Vec<TimeOff> = self
            .periods
            .read()
            .await
            .values()
            .filter(|p| p.clinician_id == clinician_id && ends_after.map_or(true, |at| p.end_datetime > at))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.start_datetime);
        Ok(found)
    }

    async fn find_approved_overlapping(
        &self,
        clinician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, RepositoryError> {
        Ok(self
            .periods
            .read()
            .await
            .values()
            .filter(|p| p.clinician_id == clinician_id && p.is_approved && p.overlaps(start, end))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct SpecializationTables {
    rows: HashMap<Uuid, Specialization>,
    links: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct InMemorySpecializationRepository {
    tables: RwLock<SpecializationTables>,
}

impl InMemorySpecializationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpecializationRepository for InMemorySpecializationRepository {
    async fn insert(&self, specialization: Specialization) -> Result<Specialization, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.rows.values().any(|s| s.name.eq_ignore_ascii_case(&specialization.name)) {
            return Err(RepositoryError::conflict("specializations_name_key"));
        }
        if tables.rows.values().any(|s| s.slug == specialization.slug) {
            return Err(RepositoryError::conflict("specializations_slug_key"));
        }
        tables.rows.insert(specialization.id, specialization.clone());
        Ok(specialization)
    }

    async fn list(&self, filter: &SpecializationFilter) -> Result<Vec<Specialization>, RepositoryError> {
        let mut found: Vec<Specialization> = self
            .tables
            .read()
            .await
            .rows
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Specialization>, RepositoryError> {
        Ok(self.tables.read().await.rows.values().find(|s| s.slug == slug).cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SpecializationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Specialization>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.rows.get_mut(&id).map(|s| {
            s.status = status;
            s.updated_at = updated_at;
            s.clone()
        }))
    }

    async fn link_clinician(&self, clinician_id: Uuid, specialization_id: Uuid) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.rows.contains_key(&specialization_id) {
            return Err(RepositoryError::NotFound);
        }
        tables.links.insert((clinician_id, specialization_id));
        Ok(())
    }

    async fn list_for_clinician(&self, clinician_id: Uuid) -> Result<Vec<Specialization>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut found: Vec<Specialization> = tables
            .links
            .iter()
            .filter(|(clinician, _)| *clinician == clinician_id)
            .filter_map(|(_, specialization)| tables.rows.get(specialization).cloned())
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}
