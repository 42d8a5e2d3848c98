use std::env;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Where repositories keep their rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Supabase,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Some(StorageBackend::Memory),
            "supabase" | "postgrest" => Some(StorageBackend::Supabase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Upper bound on the wait for a clinician's schedule lock.
    pub lock_timeout_ms: u64,
    /// Offset of the clinic's wall clock from UTC; availability windows are expressed in it.
    pub clinic_utc_offset_minutes: i32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2_000,
            clinic_utc_offset_minutes: 0,
        }
    }
}

impl SchedulingConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60).unwrap_or_else(|| {
            warn!(
                "Clinic UTC offset of {} minutes is out of range, falling back to UTC",
                self.clinic_utc_offset_minutes
            );
            Utc.fix()
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub scheduling: SchedulingConfig,
    pub notification_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            environment: env::var("APP_ENV")
                .ok()
                .and_then(|value| {
                    let parsed = Environment::parse(&value);
                    if parsed.is_none() {
                        warn!("APP_ENV '{}' not recognised, using development", value);
                    }
                    parsed
                })
                .unwrap_or(Environment::Development),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(3000),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|value| {
                    let parsed = StorageBackend::parse(&value);
                    if parsed.is_none() {
                        warn!("STORAGE_BACKEND '{}' not recognised, using memory", value);
                    }
                    parsed
                })
                .unwrap_or(StorageBackend::Memory),
            scheduling: SchedulingConfig {
                lock_timeout_ms: env::var("SCHEDULE_LOCK_TIMEOUT_MS")
                    .ok()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(2_000),
                clinic_utc_offset_minutes: env::var("CLINIC_UTC_OFFSET_MINUTES")
                    .ok()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(0),
            },
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        };

        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Supabase storage selected but not fully configured - missing environment variables");
        }

        if config.supabase_jwt_secret.is_empty() {
            warn!("JWT secret missing - every authenticated request will be rejected");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_role_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// Session cookies are only marked `Secure` outside development.
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environment_aliases() {
        assert_eq!(Environment::parse("prod"), Some(Environment::Production));
        assert_eq!(Environment::parse(" Development "), Some(Environment::Development));
        assert_eq!(Environment::parse("staging"), None);
    }

    #[test]
    fn parses_storage_backend() {
        assert_eq!(StorageBackend::parse("supabase"), Some(StorageBackend::Supabase));
        assert_eq!(StorageBackend::parse("MEMORY"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse("sqlite"), None);
    }

    #[test]
    fn clinic_offset_ignores_out_of_range_values() {
        let config = SchedulingConfig {
            lock_timeout_ms: 10,
            clinic_utc_offset_minutes: 90 * 60,
        };
        assert_eq!(config.clinic_offset().local_minus_utc(), 0);

        let config = SchedulingConfig {
            lock_timeout_ms: 10,
            clinic_utc_offset_minutes: 120,
        };
        assert_eq!(config.clinic_offset().local_minus_utc(), 7200);
        assert_eq!(config.lock_timeout(), Duration::from_millis(10));
    }
}
