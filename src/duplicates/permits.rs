//! Counting permit pool bounding concurrent hashing tasks.
//!
//! The producer calls [`PermitPool::acquire`] before spawning each task and
//! blocks while all permits are out. The returned [`Permit`] travels into
//! the task and gives its slot back when dropped, on success, error or
//! unwind alike.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct PermitState {
    available: usize,
    active: usize,
    peak: usize,
}

/// Fixed-capacity counting semaphore that also tracks peak usage.
#[derive(Debug)]
pub struct PermitPool {
    state: Mutex<PermitState>,
    released: Condvar,
}

/// One held slot of a [`PermitPool`]. Released on drop.
#[derive(Debug)]
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit<'a> {
    pool: &'a PermitPool,
}

impl PermitPool {
    /// Create a pool with `capacity` permits (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(PermitState {
                available: capacity,
                active: 0,
                peak: 0,
            }),
            released: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PermitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a permit, blocking until one is free.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.lock();
        while state.available == 0 {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.available -= 1;
        state.active += 1;
        state.peak = state.peak.max(state.active);
        Permit { pool: self }
    }

    #[cfg(test)]
    fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut state = self.lock();
        if state.available == 0 {
            return None;
        }
        state.available -= 1;
        state.active += 1;
        state.peak = state.peak.max(state.active);
        Some(Permit { pool: self })
    }

    fn release(&self) {
        let mut state = self.lock();
        state.available += 1;
        state.active -= 1;
        drop(state);
        self.released.notify_one();
    }

    #[cfg(test)]
    fn active(&self) -> usize {
        self.lock().active
    }

    /// Highest number of permits held at the same time so far.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.lock().peak
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}
