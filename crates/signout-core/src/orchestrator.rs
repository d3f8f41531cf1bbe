//! Batch orchestrator: the public entry point of the engine.
//!
//! [`SignoutEngine`] validates the request, resolves the concurrency ceiling
//! once per batch and drives the conflict protocol. The returned
//! [`BatchResult`] always holds exactly one entry per input element, in input
//! order, whichever phase resolved it.

use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    cancellation::BatchCancellation,
    collaborators::{
        ConcurrencyConfig, FixedConcurrency, FixedDecision, InteractiveDecision, LockTracker,
        NoopTracker,
    },
    gateway::Gateway,
    observer::{NoopObserver, Phase, PhaseObserver},
    outcome::{OperationError, Outcome},
    pool::{ConcurrencyLimit, WorkerPool, DEFAULT_CONCURRENCY},
    protocol::ConflictProtocol,
    types::LockToken,
    Error, Result,
};

// ═══════════════════════════════════════════════════════════════════════════
// RESULT TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Final state of one element of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry<I, C> {
    pub item: I,
    pub outcome: Outcome<C>,
    /// Phase that produced `outcome`.
    pub resolved_in: Phase,
    /// Whether the signout is held at the end of the run.
    pub locked: bool,
}

impl<I, C> BatchEntry<I, C> {
    /// Content fetched without a signout (phase 3 success).
    #[must_use]
    pub const fn is_read_only_copy(&self) -> bool {
        !self.locked && self.outcome.is_success()
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult<I, C> {
    entries: Vec<BatchEntry<I, C>>,
    override_decision: Option<bool>,
    cancelled: bool,
}

/// Serializable counts for reporting a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub locked: usize,
    pub read_only: usize,
    pub failed: usize,
    pub override_requested: bool,
    pub override_accepted: bool,
    pub cancelled: bool,
}

impl<I, C> BatchResult<I, C> {
    pub(crate) const fn new(
        entries: Vec<BatchEntry<I, C>>,
        override_decision: Option<bool>,
        cancelled: bool,
    ) -> Self {
        Self {
            entries,
            override_decision,
            cancelled,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[BatchEntry<I, C>] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<BatchEntry<I, C>> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry<I, C>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Elements whose signout is held at the end of the run.
    #[must_use]
    pub fn locked_items(&self) -> Vec<&I> {
        self.entries
            .iter()
            .filter(|entry| entry.locked)
            .map(|entry| &entry.item)
            .collect()
    }

    /// Elements that ended in a failure, with the reason.
    #[must_use]
    pub fn failures(&self) -> Vec<(&I, &OperationError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.error().map(|error| (&entry.item, error)))
            .collect()
    }

    /// Whether the operator was asked to override signouts.
    #[must_use]
    pub const fn override_requested(&self) -> bool {
        self.override_decision.is_some()
    }

    #[must_use]
    pub const fn override_accepted(&self) -> bool {
        matches!(self.override_decision, Some(true))
    }

    #[must_use]
    pub const fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let (locked, read_only, failed) =
            self.entries
                .iter()
                .fold((0, 0, 0), |(locked, read_only, failed), entry| {
                    if entry.locked {
                        (locked + 1, read_only, failed)
                    } else if entry.outcome.is_success() {
                        (locked, read_only + 1, failed)
                    } else {
                        (locked, read_only, failed + 1)
                    }
                });

        BatchSummary {
            total: self.entries.len(),
            locked,
            read_only,
            failed,
            override_requested: self.override_requested(),
            override_accepted: self.override_accepted(),
            cancelled: self.cancelled,
        }
    }
}

impl<I: PartialEq, C> BatchResult<I, C> {
    /// Entry for a given element.
    #[must_use]
    pub fn get(&self, item: &I) -> Option<&BatchEntry<I, C>> {
        self.entries.iter().find(|entry| &entry.item == item)
    }
}

impl<'a, I, C> IntoIterator for &'a BatchResult<I, C> {
    type Item = &'a BatchEntry<I, C>;
    type IntoIter = std::slice::Iter<'a, BatchEntry<I, C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════

/// Signout-aware retrieval engine for one gateway.
///
/// The engine keeps no state between batches; every call to
/// [`SignoutEngine::resolve`] is independent.
pub struct SignoutEngine<G: Gateway> {
    gateway: G,
    decision: Arc<dyn InteractiveDecision>,
    tracker: Arc<dyn LockTracker<G::Item>>,
    observer: Arc<dyn PhaseObserver>,
    concurrency: Arc<dyn ConcurrencyConfig>,
}

/// Builder for [`SignoutEngine`].
pub struct SignoutEngineBuilder<G: Gateway> {
    gateway: G,
    decision: Option<Arc<dyn InteractiveDecision>>,
    tracker: Option<Arc<dyn LockTracker<G::Item>>>,
    observer: Option<Arc<dyn PhaseObserver>>,
    concurrency: Option<Arc<dyn ConcurrencyConfig>>,
}

impl<G: Gateway> SignoutEngineBuilder<G> {
    /// Who answers the override question. Defaults to always declining.
    #[must_use]
    pub fn decision(mut self, decision: Arc<dyn InteractiveDecision>) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Who hears about new signouts. Defaults to nobody.
    #[must_use]
    pub fn tracker(mut self, tracker: Arc<dyn LockTracker<G::Item>>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Phase telemetry. Defaults to none.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Concurrency setting. Defaults to [`DEFAULT_CONCURRENCY`].
    #[must_use]
    pub fn concurrency(mut self, concurrency: Arc<dyn ConcurrencyConfig>) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    #[must_use]
    pub fn build(self) -> SignoutEngine<G> {
        SignoutEngine {
            gateway: self.gateway,
            decision: self
                .decision
                .unwrap_or_else(|| Arc::new(FixedDecision::decline())),
            tracker: self.tracker.unwrap_or_else(|| Arc::new(NoopTracker)),
            observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
            concurrency: self.concurrency.unwrap_or_else(|| {
                Arc::new(FixedConcurrency(
                    i64::try_from(DEFAULT_CONCURRENCY).unwrap_or(1),
                ))
            }),
        }
    }
}

impl<G: Gateway> SignoutEngine<G> {
    #[must_use]
    pub fn builder(gateway: G) -> SignoutEngineBuilder<G> {
        SignoutEngineBuilder {
            gateway,
            decision: None,
            tracker: None,
            observer: None,
            concurrency: None,
        }
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetch and sign out every element, resolving conflicts along the way.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, the batch names an element
    /// twice, or the override decision collaborator fails. Per-element
    /// failures are reported inside the result.
    pub async fn resolve(
        &self,
        items: Vec<G::Item>,
        token: &G::Token,
    ) -> Result<BatchResult<G::Item, G::Content>> {
        self.resolve_with_cancellation(items, token, &BatchCancellation::new())
            .await
    }

    /// Like [`Self::resolve`], stopping between phases (and before starting
    /// further remote calls) once `cancellation` fires. Elements not resolved
    /// by then are reported as cancelled; everything already obtained is kept.
    pub async fn resolve_with_cancellation(
        &self,
        items: Vec<G::Item>,
        token: &G::Token,
        cancellation: &BatchCancellation,
    ) -> Result<BatchResult<G::Item, G::Content>> {
        token.validate()?;
        if let Some(duplicate) = items.iter().duplicates().next() {
            return Err(Error::DuplicateItem(duplicate.to_string()));
        }

        let limit = ConcurrencyLimit::from_config(self.concurrency.as_ref());
        tracing::debug!(
            elements = items.len(),
            concurrency = limit.get(),
            "Resolving signout batch"
        );

        let protocol = ConflictProtocol {
            gateway: &self.gateway,
            token,
            decision: self.decision.as_ref(),
            tracker: self.tracker.as_ref(),
            observer: self.observer.as_ref(),
            pool: WorkerPool::new(limit),
            cancellation,
        };
        let result = protocol.run(items).await?;

        tracing::debug!(summary = ?result.summary(), "Signout batch resolved");
        Ok(result)
    }

    /// Single-element convenience over [`Self::resolve`].
    pub async fn resolve_one(
        &self,
        item: G::Item,
        token: &G::Token,
    ) -> Result<BatchEntry<G::Item, G::Content>> {
        self.resolve(vec![item], token)
            .await?
            .into_entries()
            .pop()
            .ok_or_else(|| Error::unknown("single-element batch produced no entry"))
    }
}
