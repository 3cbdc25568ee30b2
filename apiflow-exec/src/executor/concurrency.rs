use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many steps of one flow run may be in flight at once.
pub struct ConcurrencyLimits {
    global: Arc<Semaphore>,
}

impl ConcurrencyLimits {
    /// A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            global: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    /// Takes a permit only if one is free right now; the scheduler never waits on a permit
    /// while it could be handling a completion.
    pub fn try_acquire(&self) -> Option<ConcurrencyPermit> {
        self.global
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| ConcurrencyPermit { _global: permit })
    }
}

pub struct ConcurrencyPermit {
    _global: OwnedSemaphorePermit,
}
