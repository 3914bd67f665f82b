//! Per-session mutual exclusion.
//!
//! Every read-modify-write against a class session stream runs while holding
//! that session's lock. Locks are created on first use and evicted once no
//! holder or waiter references them. Distinct ids never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::domain::class_session::ClassSessionError;
use crate::domain::foundation::ClassSessionId;

type SessionLock = Arc<AsyncMutex<()>>;

/// Registry of per-session async locks.
pub struct LockRegistry {
    locks: Mutex<HashMap<ClassSessionId, SessionLock>>,
    acquire_timeout: Duration,
}

impl LockRegistry {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            acquire_timeout,
        }
    }

    /// Waits for exclusive access to `id`.
    ///
    /// The lock is held until the returned guard drops, on every exit path.
    ///
    /// # Errors
    ///
    /// `LockTimeout` if the lock is not obtained within the configured timeout.
    pub async fn acquire(&self, id: ClassSessionId) -> Result<SessionLockGuard<'_>, ClassSessionError> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };

        if lock.try_lock().is_err() {
            debug!(class_session_id = %id, "waiting for class session lock");
        }

        let acquired = tokio::time::timeout(self.acquire_timeout, lock.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(SessionLockGuard {
                registry: self,
                id,
                guard: Some(guard),
            }),
            Err(_) => {
                warn!(
                    class_session_id = %id,
                    timeout_ms = self.acquire_timeout.as_millis() as u64,
                    "timed out waiting for class session lock"
                );
                // `lock` moved into the dropped wait; a holder that released
                // meanwhile saw our reference and left the entry behind.
                self.evict_if_unused(id);
                Err(ClassSessionError::LockTimeout(id))
            }
        }
    }

    /// Number of ids with a live lock entry.
    pub fn active_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn evict_if_unused(&self, id: ClassSessionId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&id);
        }
    }
}

/// Exclusive access to one class session. Released on drop.
pub struct SessionLockGuard<'a> {
    registry: &'a LockRegistry,
    id: ClassSessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionLockGuard<'_> {
    pub fn id(&self) -> ClassSessionId {
        self.id
    }
}

impl Drop for SessionLockGuard<'_> {
    fn drop(&mut self) {
        // Release before the eviction check so our own reference is gone.
        drop(self.guard.take());
        self.registry.evict_if_unused(self.id);
    }
}
