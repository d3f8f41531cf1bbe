//! Injected collaborators: override decision, lock tracking, concurrency setting.
//!
//! These are the only things the engine talks to besides the [`crate::Gateway`].

use async_trait::async_trait;
use thiserror::Error;

use crate::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// OVERRIDE DECISION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Failure of the decision collaborator itself (not a "no" answer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecisionError {
    /// The prompt could not be shown or read.
    #[error("prompt unavailable: {0}")]
    PromptUnavailable(String),

    /// Any other failure inside the collaborator.
    #[error("{0}")]
    Failed(String),
}

/// Asks whether signouts held by other users should be overridden.
///
/// Called at most once per batch with the names of every conflicted element.
#[async_trait]
pub trait InteractiveDecision: Send + Sync {
    /// `Ok(Some(true))` to override, `Ok(Some(false))` to decline,
    /// `Ok(None)` when no answer was given. No answer counts as a decline.
    async fn confirm_override(
        &self,
        conflicted: &[String],
    ) -> std::result::Result<Option<bool>, DecisionError>;
}

/// Automated policy that always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(pub bool);

impl FixedDecision {
    #[must_use]
    pub const fn accept() -> Self {
        Self(true)
    }

    #[must_use]
    pub const fn decline() -> Self {
        Self(false)
    }
}

#[async_trait]
impl InteractiveDecision for FixedDecision {
    async fn confirm_override(
        &self,
        _conflicted: &[String],
    ) -> std::result::Result<Option<bool>, DecisionError> {
        Ok(Some(self.0))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LOCK TRACKING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Failure reported by a lock tracker. Logged, never propagated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("lock tracker failed: {0}")]
pub struct TrackerError(pub String);

/// Receives the elements signed out by each phase.
pub trait LockTracker<I>: Send + Sync {
    /// Record newly signed out elements. Append semantics.
    fn notify_locked(&self, items: &[I]) -> std::result::Result<(), TrackerError>;
}

/// Tracker that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl<I> LockTracker<I> for NoopTracker {
    fn notify_locked(&self, _items: &[I]) -> std::result::Result<(), TrackerError> {
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONCURRENCY SETTING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Source of the maximum number of simultaneous remote calls.
///
/// Errors and non-positive values are replaced by
/// [`crate::pool::DEFAULT_CONCURRENCY`].
pub trait ConcurrencyConfig: Send + Sync {
    fn max_concurrency(&self) -> Result<i64>;
}

/// A constant ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConcurrency(pub i64);

impl ConcurrencyConfig for FixedConcurrency {
    fn max_concurrency(&self) -> Result<i64> {
        Ok(self.0)
    }
}
