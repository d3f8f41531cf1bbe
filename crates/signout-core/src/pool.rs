//! Bounded worker pool for remote calls.
//!
//! Runs independent async tasks with at most `limit` in flight. A free slot is
//! refilled as soon as any task finishes, and results are returned in input
//! order regardless of completion order.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{any::Any, future::Future, num::NonZeroUsize, panic::AssertUnwindSafe};

use futures::{
    future::{self, Either},
    stream, FutureExt, StreamExt,
};
use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::{cancellation::BatchCancellation, collaborators::ConcurrencyConfig, Error, Result};

/// Ceiling used when the configured one is missing or invalid.
pub const DEFAULT_CONCURRENCY: usize = 4;

const DEFAULT_LIMIT: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CONCURRENCY) {
    Some(limit) => limit,
    None => NonZeroUsize::MIN,
};

/// Maximum number of simultaneous remote calls. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConcurrencyLimit(NonZeroUsize);

impl Default for ConcurrencyLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

impl ConcurrencyLimit {
    /// Validate a raw setting. Zero and negative values fail fast.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConcurrency` if `value < 1`.
    pub fn new(value: i64) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(Error::InvalidConcurrency(value))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Read the ceiling from a collaborator, falling back to
    /// [`DEFAULT_CONCURRENCY`] when it errors or returns an invalid value.
    pub fn from_config(config: &dyn ConcurrencyConfig) -> Self {
        match config.max_concurrency().and_then(Self::new) {
            Ok(limit) => limit,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    default = DEFAULT_CONCURRENCY,
                    "Concurrency setting unusable, using default"
                );
                Self::default()
            }
        }
    }
}

/// Why a pooled task produced no value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskFailure {
    /// The task panicked; siblings kept running.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was never started because the batch was cancelled.
    #[error("task cancelled before it started")]
    Cancelled,
}

/// Executes task lists under a fixed [`ConcurrencyLimit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    limit: ConcurrencyLimit,
}

impl WorkerPool {
    #[must_use]
    pub const fn new(limit: ConcurrencyLimit) -> Self {
        Self { limit }
    }

    #[must_use]
    pub const fn limit(&self) -> ConcurrencyLimit {
        self.limit
    }

    /// Run every task; result `i` belongs to task `i`.
    pub async fn run<F, Fut, R>(&self, tasks: Vec<F>) -> Vec<std::result::Result<R, TaskFailure>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        self.run_inner(tasks, None).await
    }

    /// Like [`Self::run`], but tasks not yet started when `cancellation` fires
    /// yield [`TaskFailure::Cancelled`] without running.
    pub async fn run_cancellable<F, Fut, R>(
        &self,
        tasks: Vec<F>,
        cancellation: &BatchCancellation,
    ) -> Vec<std::result::Result<R, TaskFailure>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        self.run_inner(tasks, Some(cancellation)).await
    }

    async fn run_inner<F, Fut, R>(
        &self,
        tasks: Vec<F>,
        cancellation: Option<&BatchCancellation>,
    ) -> Vec<std::result::Result<R, TaskFailure>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        tracing::debug!(tasks = tasks.len(), limit = self.limit.get(), "Dispatching pool");

        // The closure runs when a slot frees up, so the cancellation check
        // happens at task start rather than at submission.
        stream::iter(tasks.into_iter().enumerate())
            .map(|(index, task)| {
                if cancellation.is_some_and(BatchCancellation::is_cancelled) {
                    Either::Left(future::ready((index, Err(TaskFailure::Cancelled))))
                } else {
                    Either::Right(AssertUnwindSafe(task()).catch_unwind().map(move |caught| {
                        (
                            index,
                            caught.map_err(|payload| TaskFailure::Panicked(panic_message(&*payload))),
                        )
                    }))
                }
            })
            .buffer_unordered(self.limit.get())
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .sorted_by_key(|(index, _)| *index)
            .map(|(_, result)| result)
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
