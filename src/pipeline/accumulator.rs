//! Lock-guarded running total written by the reducing stage.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared running total.
///
/// Cloning yields another handle to the same total. The value is only ever
/// touched inside the lock, so concurrent [`add`](Self::add) calls never lose
/// an update.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    total: Arc<Mutex<i64>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` and return the running total it produced.
    ///
    /// Saturates at the `i64` bounds.
    pub fn add(&self, value: i64) -> i64 {
        let mut total = self.lock();
        *total = total.saturating_add(value);
        *total
    }

    pub fn total(&self) -> i64 {
        *self.lock()
    }

    // A panic while holding the lock cannot leave an i64 half-written.
    fn lock(&self) -> MutexGuard<'_, i64> {
        self.total.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
