// lib/src/claim_locks.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use log::{debug, warn};
use models::{SchedulingError, SchedulingResult};
use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};
use uuid::Uuid;

/// What a check-then-write section claims. Variants are declared in lock
/// order: when several claims are held at once they are always taken
/// appointment first, then doctor, then resources by ascending id.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ClaimKey {
    Appointment(Uuid),
    Doctor(Uuid),
    Resource(Uuid),
    Email(String),
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimKey::Appointment(id) => write!(f, "appointment {}", id),
            ClaimKey::Doctor(id) => write!(f, "doctor {}", id),
            ClaimKey::Resource(id) => write!(f, "resource {}", id),
            ClaimKey::Email(email) => write!(f, "email {}", email),
        }
    }
}

type ClaimTable = DashMap<ClaimKey, Arc<TokioMutex<()>>>;

/// In-process keyed mutual exclusion. Unrelated keys never contend; entries
/// are removed as soon as nobody holds or waits for them.
#[derive(Clone, Debug, Default)]
pub struct ClaimLocks {
    table: Arc<ClaimTable>,
}

/// Holds one claim until dropped.
#[derive(Debug)]
pub struct ClaimGuard {
    key: ClaimKey,
    table: Arc<ClaimTable>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        // The table entry and this guard's own handle account for two references.
        self.table.remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) <= 2);
    }
}

impl ClaimLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `wait` for the claim on `key`.
    pub async fn acquire(&self, key: ClaimKey, wait: Duration) -> SchedulingResult<ClaimGuard> {
        let mutex = Arc::clone(self.table.entry(key.clone()).or_default().value());
        match tokio::time::timeout(wait, mutex.lock_owned()).await {
            Ok(guard) => {
                debug!("Claimed {}", key);
                Ok(ClaimGuard { key, table: Arc::clone(&self.table), _guard: guard })
            }
            Err(_) => {
                self.table.remove_if(&key, |_, mutex| Arc::strong_count(mutex) <= 1);
                warn!("Timed out after {:?} waiting for claim on {}", wait, key);
                Err(SchedulingError::Timeout(format!("waiting for claim on {}", key)))
            }
        }
    }

    /// Claims every key in lock order, skipping duplicates. `wait` bounds the
    /// whole acquisition.
    pub async fn acquire_all(
        &self,
        keys: impl IntoIterator<Item = ClaimKey>,
        wait: Duration,
    ) -> SchedulingResult<Vec<ClaimGuard>> {
        let mut keys: Vec<ClaimKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();
        let deadline = tokio::time::Instant::now() + wait;
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            guards.push(self.acquire(key, remaining).await?);
        }
        Ok(guards)
    }

    /// Number of keys currently claimed or awaited.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
