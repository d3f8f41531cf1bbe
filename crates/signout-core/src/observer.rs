//! Phase transition events for telemetry.
//!
//! The protocol reports what happened at each phase boundary; observers decide
//! what to do with it. Nothing in the protocol depends on an observer.

use serde::Serialize;
use strum::Display;

/// Steps of the signout protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Phase 1: plain signout attempt.
    Lock,
    /// Phase 1.5: single override question for every conflicted element.
    OverrideDecision,
    /// Phase 2: forced signout of the conflicted elements.
    ForcedLock,
    /// Phase 3: copy without signout.
    ReadOnly,
}

/// Something an observer may want to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PhaseEvent {
    Started {
        phase: Phase,
        items: usize,
    },
    Completed {
        phase: Phase,
        succeeded: usize,
        conflicted: usize,
        failed: usize,
    },
    OverrideDecided {
        conflicted: usize,
        accepted: bool,
        answered: bool,
    },
    Cancelled {
        phase: Phase,
        unresolved: usize,
    },
}

/// Callback attached to phase transitions.
pub trait PhaseObserver: Send + Sync {
    fn on_event(&self, _event: &PhaseEvent) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {}

/// Observer that turns every event into a `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PhaseObserver for TracingObserver {
    fn on_event(&self, event: &PhaseEvent) {
        match event {
            PhaseEvent::Started { phase, items } => {
                tracing::debug!(phase = %phase, items, "Signout phase started");
            }
            PhaseEvent::Completed {
                phase,
                succeeded,
                conflicted,
                failed,
            } => {
                tracing::info!(
                    phase = %phase,
                    succeeded,
                    conflicted,
                    failed,
                    "Signout phase completed"
                );
            }
            PhaseEvent::OverrideDecided {
                conflicted,
                accepted,
                answered,
            } => {
                tracing::info!(conflicted, accepted, answered, "Override decision");
            }
            PhaseEvent::Cancelled { phase, unresolved } => {
                tracing::warn!(phase = %phase, unresolved, "Signout batch cancelled");
            }
        }
    }
}
