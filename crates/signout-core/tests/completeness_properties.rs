//! Property-based tests for batch completeness using proptest.
//!
//! Invariants tested:
//! - Exactly one entry per input element, in input order
//! - No element is signed out twice
//! - Only conflicted elements reach the forced or read-only phase
//! - Held signouts are exactly the phase 1 and phase 2 successes

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::{collections::HashSet, sync::Arc};

use common::{elements, token, RecordingDecision, ScriptedGateway};
use proptest::prelude::*;
use signout_core::{
    FixedConcurrency, OperationError, Outcome, Phase, SignoutEngine, SignoutRegistry,
};

fn batch_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        max_shrink_iters: 256,
        ..ProptestConfig::default()
    }
}

/// What the gateway answers for one element in one phase.
#[derive(Debug, Clone, Copy)]
enum Scripted {
    Ok,
    Conflict,
    Fail,
}

impl Scripted {
    fn outcome(self) -> Outcome<String> {
        match self {
            Self::Ok => Outcome::Success("body".to_string()),
            Self::Conflict => Outcome::conflict("USER2"),
            Self::Fail => Outcome::failure(OperationError::transport("timeout")),
        }
    }
}

fn scripted() -> impl Strategy<Value = Scripted> {
    prop_oneof![Just(Scripted::Ok), Just(Scripted::Conflict), Just(Scripted::Fail)]
}

fn element_script() -> impl Strategy<Value = (Scripted, Scripted, Scripted)> {
    (scripted(), scripted(), scripted())
}

proptest! {
    #![proptest_config(batch_config())]

    #[test]
    fn every_element_gets_exactly_one_entry(
        script in prop::collection::vec(element_script(), 0..16),
        accept in any::<bool>(),
        ceiling in 1_i64..6,
    ) {
        let names: Vec<String> = (0..script.len()).map(|i| format!("EL{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let gateway = names.iter().zip(&script).fold(
            ScriptedGateway::new(),
            |gateway, (name, (lock, forced, read_only))| {
                gateway
                    .on_lock(name, lock.outcome())
                    .on_forced(name, forced.outcome())
                    .on_read_only(name, read_only.outcome())
            },
        );
        let registry = Arc::new(SignoutRegistry::<common::Element>::new());
        let engine = SignoutEngine::builder(gateway)
            .decision(RecordingDecision::answering(Some(accept)))
            .tracker(registry.clone())
            .concurrency(Arc::new(FixedConcurrency(ceiling)))
            .build();

        let result = tokio_test::block_on(engine.resolve(elements(&refs), &token())).unwrap();

        // One entry per element, input order.
        let returned: Vec<String> = result.iter().map(|e| e.item.name().to_string()).collect();
        prop_assert_eq!(&returned, &names);

        let conflicted: HashSet<&str> = names
            .iter()
            .zip(&script)
            .filter(|(_, (lock, _, _))| matches!(lock, Scripted::Conflict))
            .map(|(name, _)| name.as_str())
            .collect();

        // Each element hits the lock call once; later phases only see conflicts.
        let gateway = engine.gateway();
        let lock_calls = gateway.calls_for(Phase::Lock);
        prop_assert_eq!(lock_calls.len(), names.len());
        prop_assert_eq!(lock_calls.iter().collect::<HashSet<_>>().len(), names.len());
        for name in gateway.calls_for(Phase::ForcedLock) {
            prop_assert!(accept && conflicted.contains(name.as_str()));
        }
        for name in gateway.calls_for(Phase::ReadOnly) {
            prop_assert!(conflicted.contains(name.as_str()));
        }

        // Held signouts are phase 1 successes plus forced successes.
        let expected_locked: Vec<&str> = names
            .iter()
            .zip(&script)
            .filter(|(_, (lock, forced, _))| match lock {
                Scripted::Ok => true,
                Scripted::Conflict => accept && matches!(forced, Scripted::Ok),
                Scripted::Fail => false,
            })
            .map(|(name, _)| name.as_str())
            .collect();
        let locked: Vec<&str> = result.locked_items().iter().map(|e| e.name()).collect();
        prop_assert_eq!(&locked, &expected_locked);

        let tracked: HashSet<String> =
            registry.snapshot().iter().map(|e| e.name().to_string()).collect();
        prop_assert_eq!(tracked.len(), expected_locked.len());

        // At most one override question, and only when something conflicted.
        prop_assert_eq!(result.override_requested(), !conflicted.is_empty());
        prop_assert!(!result.was_cancelled());
    }
}
