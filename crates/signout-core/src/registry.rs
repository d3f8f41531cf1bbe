//! In-memory record of signed out elements.
//!
//! Receives the per-phase notifications of the protocol and keeps them in
//! arrival order, so a crash mid-batch still leaves earlier signouts recorded.

use std::sync::{Mutex, MutexGuard};

use crate::{
    collaborators::{LockTracker, TrackerError},
    types::BatchItem,
};

/// Thread-safe, append-only signout list.
#[derive(Debug)]
pub struct SignoutRegistry<I> {
    notifications: Mutex<Vec<Vec<I>>>,
}

impl<I> Default for SignoutRegistry<I> {
    fn default() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }
}

impl<I: BatchItem> SignoutRegistry<I> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> std::result::Result<MutexGuard<'_, Vec<Vec<I>>>, TrackerError> {
        self.notifications
            .lock()
            .map_err(|e| TrackerError(format!("signout registry poisoned: {e}")))
    }

    /// Every element currently recorded as signed out, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<I> {
        self.guard()
            .map(|notifications| notifications.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// The notifications received so far, one entry per call.
    #[must_use]
    pub fn notifications(&self) -> Vec<Vec<I>> {
        self.guard()
            .map(|notifications| notifications.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, item: &I) -> bool {
        self.guard()
            .map(|notifications| notifications.iter().flatten().any(|held| held == item))
            .unwrap_or(false)
    }

    /// Forget a signout, e.g. after the element was signed back in.
    ///
    /// Returns whether anything was removed.
    pub fn release(&self, item: &I) -> bool {
        self.guard()
            .map(|mut notifications| {
                let before: usize = notifications.iter().map(Vec::len).sum();
                notifications
                    .iter_mut()
                    .for_each(|batch| batch.retain(|held| held != item));
                notifications.retain(|batch| !batch.is_empty());
                let after: usize = notifications.iter().map(Vec::len).sum();
                before != after
            })
            .unwrap_or(false)
    }
}

impl<I: BatchItem> LockTracker<I> for SignoutRegistry<I> {
    fn notify_locked(&self, items: &[I]) -> std::result::Result<(), TrackerError> {
        tracing::debug!(count = items.len(), "Recording signed out elements");
        self.guard()?.push(items.to_vec());
        Ok(())
    }
}
