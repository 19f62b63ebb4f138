//! Admission control: bounds the number of in-flight tasks.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Global gate capping how many tasks may be active at once
///
/// Backed by a counting semaphore sized to the ceiling. A successful
/// [`try_acquire`](AdmissionController::try_acquire) hands out an
/// [`AdmissionPermit`]; dropping the permit releases the slot, so every
/// acquire is matched by exactly one release.
#[derive(Clone, Debug)]
pub struct AdmissionController {
    permits: Arc<Semaphore>,
    ceiling: usize,
}

/// One admitted task's slot, released on drop
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionController {
    /// Create a controller admitting at most `ceiling` tasks
    pub fn new(ceiling: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(ceiling)),
            ceiling,
        }
    }

    /// Take a slot if one is free, without waiting
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionPermit { _permit: permit })
    }

    /// Number of slots currently held
    pub fn active(&self) -> usize {
        self.ceiling - self.permits.available_permits()
    }

    /// Configured maximum number of slots
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}
