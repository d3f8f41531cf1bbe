//! # Signout Core
//!
//! Signout-aware, bounded-concurrency retrieval of source-control elements.
//!
//! A batch of elements is fetched with a signout (exclusive lock) each. When
//! another user already holds a signout, the operator is asked once whether to
//! override it; overridden elements are force-signed-out, and anything still
//! without a signout is fetched as a read-only copy. Remote calls run through
//! a bounded worker pool and every element gets exactly one final outcome.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! Per-element failures are values ([`Outcome::OtherFailure`]) inside the
//! [`BatchResult`]. Only programmer errors (invalid token, duplicate element)
//! and a failing override collaborator surface as [`Error`].

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod cancellation;
pub mod collaborators;
pub mod config;
mod error;
pub mod gateway;
pub mod logging;
pub mod observer;
pub mod orchestrator;
pub mod outcome;
pub mod pool;
pub mod prompt;
mod protocol;
pub mod registry;
pub mod types;

pub use cancellation::BatchCancellation;
pub use collaborators::{
    ConcurrencyConfig, DecisionError, FixedConcurrency, FixedDecision, InteractiveDecision,
    LockTracker, NoopTracker, TrackerError,
};
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use observer::{NoopObserver, Phase, PhaseEvent, PhaseObserver, TracingObserver};
pub use orchestrator::{BatchEntry, BatchResult, BatchSummary, SignoutEngine, SignoutEngineBuilder};
pub use outcome::{Classification, FailureKind, OperationError, Outcome};
pub use pool::{ConcurrencyLimit, TaskFailure, WorkerPool, DEFAULT_CONCURRENCY};
pub use prompt::TerminalPrompt;
pub use registry::SignoutRegistry;
pub use types::{BatchItem, ElementCoordinate, LockToken, SignoutToken, StageNumber};
