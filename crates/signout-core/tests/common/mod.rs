//! Shared test doubles for the signout engine.
//!
//! `ScriptedGateway` answers each remote call from a per-element script and
//! records every call it receives, so tests can assert on call sets and on the
//! number of calls in flight.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use signout_core::{
    BatchCancellation, DecisionError, ElementCoordinate, Gateway, InteractiveDecision,
    LockTracker, Outcome, Phase, PhaseEvent, PhaseObserver, SignoutToken, TrackerError,
};

pub type Element = ElementCoordinate;

/// Element `DEV/1/FIN/GL/COBOL/<name>`.
pub fn element(name: &str) -> Element {
    ElementCoordinate::new("DEV", 1, "FIN", "GL", "COBOL", name).expect("valid test element")
}

pub fn elements(names: &[&str]) -> Vec<Element> {
    names.iter().map(|name| element(name)).collect()
}

pub fn token() -> SignoutToken {
    SignoutToken::new("CHG0042", "quarterly rate update").expect("valid test token")
}

// ============================================================================
// SCRIPTED GATEWAY
// ============================================================================

#[derive(Default)]
pub struct ScriptedGateway {
    lock: HashMap<String, Outcome<String>>,
    forced: HashMap<String, Outcome<String>>,
    read_only: HashMap<String, Outcome<String>>,
    panic_on_lock: Vec<String>,
    cancel_during: Option<(Phase, String, BatchCancellation)>,
    delay: Duration,
    calls: Mutex<Vec<(Phase, String)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_lock(mut self, name: &str, outcome: Outcome<String>) -> Self {
        self.lock.insert(name.to_uppercase(), outcome);
        self
    }

    pub fn on_forced(mut self, name: &str, outcome: Outcome<String>) -> Self {
        self.forced.insert(name.to_uppercase(), outcome);
        self
    }

    pub fn on_read_only(mut self, name: &str, outcome: Outcome<String>) -> Self {
        self.read_only.insert(name.to_uppercase(), outcome);
        self
    }

    pub fn panic_on_lock(mut self, name: &str) -> Self {
        self.panic_on_lock.push(name.to_uppercase());
        self
    }

    /// Cancel `handle` from inside the given call, after it has been answered.
    pub fn cancel_during(mut self, phase: Phase, name: &str, handle: BatchCancellation) -> Self {
        self.cancel_during = Some((phase, name.to_uppercase(), handle));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Names passed to the given phase, in call order.
    pub fn calls_for(&self, phase: Phase) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|(called, _)| *called == phase)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn answer(
        &self,
        phase: Phase,
        item: &Element,
        script: &HashMap<String, Outcome<String>>,
    ) -> Outcome<String> {
        let name = item.name().to_string();
        self.calls
            .lock()
            .expect("calls lock")
            .push((phase, name.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((cancel_phase, cancel_name, handle)) = &self.cancel_during {
            if *cancel_phase == phase && *cancel_name == name {
                handle.cancel();
            }
        }

        assert!(
            !(phase == Phase::Lock && self.panic_on_lock.contains(&name)),
            "scripted panic for {name}"
        );

        script
            .get(&name)
            .cloned()
            .unwrap_or_else(|| Outcome::Success(format!("{phase}:{name}")))
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    type Item = Element;
    type Token = SignoutToken;
    type Content = String;

    async fn lock(&self, item: &Element, _token: &SignoutToken) -> Outcome<String> {
        self.answer(Phase::Lock, item, &self.lock).await
    }

    async fn lock_forced(&self, item: &Element, _token: &SignoutToken) -> Outcome<String> {
        self.answer(Phase::ForcedLock, item, &self.forced).await
    }

    async fn read_only(&self, item: &Element) -> Outcome<String> {
        self.answer(Phase::ReadOnly, item, &self.read_only).await
    }
}

// ============================================================================
// DECISION DOUBLES
// ============================================================================

/// Gives a fixed answer and records every question.
pub struct RecordingDecision {
    answer: Result<Option<bool>, DecisionError>,
    cancel_on_ask: Option<BatchCancellation>,
    asked: Mutex<Vec<Vec<String>>>,
}

impl RecordingDecision {
    pub fn answering(answer: Option<bool>) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer),
            cancel_on_ask: None,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(DecisionError::Failed(message.to_string())),
            cancel_on_ask: None,
            asked: Mutex::new(Vec::new()),
        })
    }

    /// Answers yes, but cancels the batch while "the dialog is open".
    pub fn cancelling(handle: BatchCancellation) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(Some(true)),
            cancel_on_ask: Some(handle),
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn questions(&self) -> Vec<Vec<String>> {
        self.asked.lock().expect("asked lock").clone()
    }
}

#[async_trait]
impl InteractiveDecision for RecordingDecision {
    async fn confirm_override(&self, conflicted: &[String]) -> Result<Option<bool>, DecisionError> {
        self.asked
            .lock()
            .expect("asked lock")
            .push(conflicted.to_vec());
        if let Some(handle) = &self.cancel_on_ask {
            handle.cancel();
        }
        self.answer.clone()
    }
}

// ============================================================================
// TRACKER AND OBSERVER DOUBLES
// ============================================================================

/// Tracker that always fails but counts attempts.
#[derive(Default)]
pub struct FailingTracker {
    pub attempts: AtomicUsize,
}

impl LockTracker<Element> for FailingTracker {
    fn notify_locked(&self, _items: &[Element]) -> Result<(), TrackerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TrackerError("tree view refresh failed".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PhaseEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<PhaseEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl PhaseObserver for RecordingObserver {
    fn on_event(&self, event: &PhaseEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}
