//! Per-element outcome of a remote operation.
//!
//! The gateway decides how a remote response is classified; the engine only
//! branches on the variant.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Why an operation failed, as far as the engine needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The remote system rejected the request.
    Remote,
    /// The request never reached the remote system or the reply was lost.
    Transport,
    /// Credentials were missing or refused.
    Credentials,
    /// The request was malformed for the remote system.
    Validation,
    /// The forced signout still reported the element as held by someone else.
    ForcedLockConflict,
    /// The task running the call panicked.
    TaskPanicked,
    /// The batch was cancelled before the call started.
    Cancelled,
}

/// A failure carrying enough detail to tell the operator which element failed
/// and why.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct OperationError {
    pub kind: FailureKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Remote, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Credentials, message)
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "batch cancelled before the request started")
    }
}

/// Result of one remote call for one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<C> {
    /// Content was fetched (and, for lock calls, the signout is held).
    Success(C),
    /// Another user holds the signout.
    LockConflict { reason: String },
    /// Anything else went wrong.
    OtherFailure(OperationError),
}

/// Variant tag of an [`Outcome`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    LockConflict,
    OtherFailure,
}

impl<C> Outcome<C> {
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::LockConflict {
            reason: reason.into(),
        }
    }

    pub const fn failure(error: OperationError) -> Self {
        Self::OtherFailure(error)
    }

    #[must_use]
    pub const fn classification(&self) -> Classification {
        match self {
            Self::Success(_) => Classification::Success,
            Self::LockConflict { .. } => Classification::LockConflict,
            Self::OtherFailure(_) => Classification::OtherFailure,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::LockConflict { .. })
    }

    #[must_use]
    pub const fn content(&self) -> Option<&C> {
        match self {
            Self::Success(content) => Some(content),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&OperationError> {
        match self {
            Self::OtherFailure(error) => Some(error),
            _ => None,
        }
    }

    /// Collapse a lock conflict into a failure of the given kind.
    ///
    /// Used where a conflict cannot be recovered any further.
    #[must_use]
    pub fn conflict_as_failure(self, kind: FailureKind) -> Self {
        match self {
            Self::LockConflict { reason } => Self::OtherFailure(OperationError::new(kind, reason)),
            other => other,
        }
    }
}
