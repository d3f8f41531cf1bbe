//! Conflict resolution protocol - the signout state machine for one batch.
//!
//! # State Machine
//!
//! ```text
//! lock ──success──────────────────────────────────────────────> locked
//!   │  ──other failure────────────────────────────────────────> failed
//!   └─conflict─> override? ──yes─> forced lock ──success──────> locked
//!                   │                   └─failure─┐
//!                   └──no / no answer─────────────┴─> read only ─> copy | failed
//! ```
//!
//! Every remote phase runs at most once per batch, so a run always terminates
//! after three rounds of remote calls. The override question is asked once for
//! the whole conflicted subset.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::{
    cancellation::BatchCancellation,
    collaborators::{InteractiveDecision, LockTracker},
    gateway::Gateway,
    observer::{Phase, PhaseEvent, PhaseObserver},
    orchestrator::{BatchEntry, BatchResult},
    outcome::{FailureKind, OperationError, Outcome},
    pool::{TaskFailure, WorkerPool},
    Error, Result,
};

/// Remote call made by a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteCall {
    Lock,
    ForcedLock,
    ReadOnly,
}

impl RemoteCall {
    const fn phase(self) -> Phase {
        match self {
            Self::Lock => Phase::Lock,
            Self::ForcedLock => Phase::ForcedLock,
            Self::ReadOnly => Phase::ReadOnly,
        }
    }
}

/// Final state of one element.
struct Resolution<C> {
    outcome: Outcome<C>,
    phase: Phase,
    locked: bool,
}

/// Per-position resolutions; `None` until some phase resolves the element.
type Slots<C> = Vec<Option<Resolution<C>>>;

/// One protocol run against one token. Holds no state beyond the run.
pub(crate) struct ConflictProtocol<'a, G: Gateway> {
    pub(crate) gateway: &'a G,
    pub(crate) token: &'a G::Token,
    pub(crate) decision: &'a dyn InteractiveDecision,
    pub(crate) tracker: &'a dyn LockTracker<G::Item>,
    pub(crate) observer: &'a dyn PhaseObserver,
    pub(crate) pool: WorkerPool,
    pub(crate) cancellation: &'a BatchCancellation,
}

impl<G: Gateway> ConflictProtocol<'_, G> {
    /// Resolve every element of `items`.
    ///
    /// # Errors
    ///
    /// Only a failing override decision collaborator aborts the run. All
    /// remote failures are reported per element.
    pub(crate) async fn run(
        &self,
        items: Vec<G::Item>,
    ) -> Result<BatchResult<G::Item, G::Content>> {
        let mut slots: Slots<G::Content> = items.iter().map(|_| None).collect();

        // PHASE 1
        if self.stop_if_cancelled(Phase::Lock, items.len()) {
            return Ok(merge(items, slots, Phase::Lock, None, true));
        }
        let everything: Vec<usize> = (0..items.len()).collect();
        let conflicted = self.lock_phase(&items, &everything, &mut slots).await;

        if conflicted.is_empty() {
            return Ok(merge(items, slots, Phase::Lock, None, false));
        }

        // PHASE 1.5
        if self.stop_if_cancelled(Phase::OverrideDecision, conflicted.len()) {
            return Ok(merge(items, slots, Phase::OverrideDecision, None, true));
        }
        let accepted = self.ask_override(&items, &conflicted).await?;

        // PHASE 2
        let fallback = if accepted {
            if self.stop_if_cancelled(Phase::ForcedLock, conflicted.len()) {
                return Ok(merge(items, slots, Phase::ForcedLock, Some(true), true));
            }
            self.forced_lock_phase(&items, &conflicted, &mut slots).await
        } else {
            conflicted
        };

        // PHASE 3
        if fallback.is_empty() {
            return Ok(merge(items, slots, Phase::ReadOnly, Some(accepted), false));
        }
        if self.stop_if_cancelled(Phase::ReadOnly, fallback.len()) {
            return Ok(merge(items, slots, Phase::ReadOnly, Some(accepted), true));
        }
        self.read_only_phase(&items, &fallback, &mut slots).await;

        Ok(merge(items, slots, Phase::ReadOnly, Some(accepted), false))
    }

    /// Phase 1. Returns the positions that hit a lock conflict.
    async fn lock_phase(
        &self,
        items: &[G::Item],
        positions: &[usize],
        slots: &mut Slots<G::Content>,
    ) -> Vec<usize> {
        let outcomes = self.dispatch(RemoteCall::Lock, items, positions).await;

        let mut locked = Vec::new();
        let mut conflicted = Vec::new();
        let mut failed = 0;

        for (&position, outcome) in positions.iter().zip(outcomes) {
            match outcome {
                Outcome::Success(_) => {
                    locked.push(position);
                    slots[position] = Some(Resolution {
                        outcome,
                        phase: Phase::Lock,
                        locked: true,
                    });
                }
                Outcome::LockConflict { reason } => {
                    tracing::debug!(element = %items[position], %reason, "Element signed out to another user");
                    conflicted.push(position);
                }
                Outcome::OtherFailure(_) => {
                    failed += 1;
                    slots[position] = Some(Resolution {
                        outcome,
                        phase: Phase::Lock,
                        locked: false,
                    });
                }
            }
        }

        self.observer.on_event(&PhaseEvent::Completed {
            phase: Phase::Lock,
            succeeded: locked.len(),
            conflicted: conflicted.len(),
            failed,
        });
        self.notify_locked(Phase::Lock, items, &locked);
        conflicted
    }

    /// Phase 1.5. A missing answer counts as "no".
    async fn ask_override(&self, items: &[G::Item], conflicted: &[usize]) -> Result<bool> {
        let names: Vec<String> = conflicted
            .iter()
            .map(|&position| items[position].to_string())
            .collect();

        let answer = self
            .decision
            .confirm_override(&names)
            .await
            .map_err(|e| Error::DecisionFailed(e.to_string()))?;
        let accepted = answer.unwrap_or(false);

        self.observer.on_event(&PhaseEvent::OverrideDecided {
            conflicted: conflicted.len(),
            accepted,
            answered: answer.is_some(),
        });
        Ok(accepted)
    }

    /// Phase 2. Returns the positions that still have no signout.
    ///
    /// A second conflict is not retried; forcing is the last signout attempt.
    async fn forced_lock_phase(
        &self,
        items: &[G::Item],
        positions: &[usize],
        slots: &mut Slots<G::Content>,
    ) -> Vec<usize> {
        let outcomes = self.dispatch(RemoteCall::ForcedLock, items, positions).await;

        let mut locked = Vec::new();
        let mut unresolved = Vec::new();

        for (&position, outcome) in positions.iter().zip(outcomes) {
            match outcome.conflict_as_failure(FailureKind::ForcedLockConflict) {
                success @ Outcome::Success(_) => {
                    locked.push(position);
                    slots[position] = Some(Resolution {
                        outcome: success,
                        phase: Phase::ForcedLock,
                        locked: true,
                    });
                }
                failure => {
                    if let Some(error) = failure.error() {
                        tracing::debug!(element = %items[position], %error, "Forced signout failed, falling back to copy");
                    }
                    unresolved.push(position);
                }
            }
        }

        self.observer.on_event(&PhaseEvent::Completed {
            phase: Phase::ForcedLock,
            succeeded: locked.len(),
            conflicted: 0,
            failed: unresolved.len(),
        });
        self.notify_locked(Phase::ForcedLock, items, &locked);
        unresolved
    }

    /// Phase 3. Every position is resolved here, one way or the other.
    async fn read_only_phase(
        &self,
        items: &[G::Item],
        positions: &[usize],
        slots: &mut Slots<G::Content>,
    ) {
        let outcomes = self.dispatch(RemoteCall::ReadOnly, items, positions).await;

        let mut succeeded = 0;
        let mut failed = 0;

        for (&position, outcome) in positions.iter().zip(outcomes) {
            let outcome = outcome.conflict_as_failure(FailureKind::Remote);
            if outcome.is_success() {
                succeeded += 1;
            } else {
                failed += 1;
            }
            slots[position] = Some(Resolution {
                outcome,
                phase: Phase::ReadOnly,
                locked: false,
            });
        }

        self.observer.on_event(&PhaseEvent::Completed {
            phase: Phase::ReadOnly,
            succeeded,
            conflicted: 0,
            failed,
        });
    }

    /// Run one remote call per position through the pool.
    async fn dispatch(
        &self,
        call: RemoteCall,
        items: &[G::Item],
        positions: &[usize],
    ) -> Vec<Outcome<G::Content>> {
        self.observer.on_event(&PhaseEvent::Started {
            phase: call.phase(),
            items: positions.len(),
        });

        let tasks: Vec<_> = positions
            .iter()
            .map(|&position| {
                let item = &items[position];
                move || self.call(call, item)
            })
            .collect();

        self.pool
            .run_cancellable(tasks, self.cancellation)
            .await
            .into_iter()
            .map(|result| result.unwrap_or_else(task_failure_outcome))
            .collect()
    }

    async fn call(&self, call: RemoteCall, item: &G::Item) -> Outcome<G::Content> {
        match call {
            RemoteCall::Lock => self.gateway.lock(item, self.token).await,
            RemoteCall::ForcedLock => self.gateway.lock_forced(item, self.token).await,
            RemoteCall::ReadOnly => self.gateway.read_only(item).await,
        }
    }

    /// Tell the tracker about this phase's signouts. Failures are logged only.
    fn notify_locked(&self, phase: Phase, items: &[G::Item], positions: &[usize]) {
        if positions.is_empty() {
            return;
        }
        let locked: Vec<G::Item> = positions
            .iter()
            .map(|&position| items[position].clone())
            .collect();

        if let Err(e) = self.tracker.notify_locked(&locked) {
            tracing::warn!(phase = %phase, count = locked.len(), error = %e, "Lock tracker notification failed");
        }
    }

    fn stop_if_cancelled(&self, phase: Phase, unresolved: usize) -> bool {
        let cancelled = self.cancellation.is_cancelled();
        if cancelled {
            self.observer
                .on_event(&PhaseEvent::Cancelled { phase, unresolved });
        }
        cancelled
    }
}

fn task_failure_outcome<C>(failure: TaskFailure) -> Outcome<C> {
    match failure {
        TaskFailure::Cancelled => Outcome::OtherFailure(OperationError::cancelled()),
        TaskFailure::Panicked(message) => {
            Outcome::OtherFailure(OperationError::new(FailureKind::TaskPanicked, message))
        }
    }
}

/// Pair every input element with its resolution, in input order.
///
/// `stopped` is set when the run stopped before a phase. Elements never reached
/// are reported as cancelled at `stopped_at`. The batch counts as cancelled when
/// it stopped early or any element ended up cancelled, whichever phase did it.
fn merge<I, C>(
    items: Vec<I>,
    slots: Slots<C>,
    stopped_at: Phase,
    override_decision: Option<bool>,
    stopped: bool,
) -> BatchResult<I, C> {
    let entries: Vec<BatchEntry<I, C>> = items
        .into_iter()
        .zip(slots)
        .map(|(item, slot)| match slot {
            Some(resolution) => BatchEntry {
                item,
                outcome: resolution.outcome,
                resolved_in: resolution.phase,
                locked: resolution.locked,
            },
            None => BatchEntry {
                item,
                outcome: Outcome::OtherFailure(OperationError::cancelled()),
                resolved_in: stopped_at,
                locked: false,
            },
        })
        .collect();

    let cancelled = stopped || entries.iter().any(|entry| is_cancelled(&entry.outcome));
    BatchResult::new(entries, override_decision, cancelled)
}

fn is_cancelled<C>(outcome: &Outcome<C>) -> bool {
    outcome
        .error()
        .is_some_and(|error| error.kind == FailureKind::Cancelled)
}
