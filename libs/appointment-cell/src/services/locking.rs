// libs/appointment-cell/src/services/locking.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppointmentError;

/// One async mutex per clinician schedule. Unassigned appointments share the nil key.
pub struct ScheduleLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl ScheduleLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    // Entries only the map still references are idle: nobody holds or waits on them, and new
    // clones are only handed out under the map mutex.
    fn lock_for(&self, key: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|id, lock| *id == key || Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(key).or_default())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    /// Wait at most the configured timeout for the schedule, then fail with `Busy`.
    pub async fn acquire(&self, clinician_id: Option<Uuid>) -> Result<OwnedMutexGuard<()>, AppointmentError> {
        let key = clinician_id.unwrap_or_else(Uuid::nil);
        let lock = self.lock_for(key);

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => {
                debug!("Schedule lock acquired for {}", key);
                Ok(guard)
            }
            Err(_) => {
                warn!("Schedule lock for {} not acquired within {:?}", key, self.timeout);
                Err(AppointmentError::Busy {
                    clinician_id,
                    reason: format!("schedule lock not acquired within {}ms", self.timeout.as_millis()),
                })
            }
        }
    }
}
