//! Error types for signout-core
//!
//! Only programmer errors and collaborator failures surface here. Per-element
//! failures travel inside [`crate::Outcome`] and never abort a batch.

use thiserror::Error;

/// Core error type for signout operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Configuration value is out of range or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Filesystem access failed
    #[error("IO error: {0}")]
    Io(String),

    /// Lock token rejected before any remote call was made
    #[error("Invalid lock token: {0}")]
    InvalidLockToken(String),

    /// Element coordinate could not be built
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Concurrency ceiling must be a positive integer
    #[error("Invalid concurrency limit {0}: must be at least 1")]
    InvalidConcurrency(i64),

    /// The same element appears twice in one batch
    #[error("Element {0} appears more than once in the batch")]
    DuplicateItem(String),

    /// The override decision collaborator failed
    #[error("Override decision failed: {0}")]
    DecisionFailed(String),

    /// Unknown error (fallback)
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an IO error.
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Whether this error came from configuration handling.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::ParseError(_) | Self::Io(_) | Self::InvalidConcurrency(_)
        )
    }
}

/// Result type alias for signout-core operations
pub type Result<T> = std::result::Result<T, Error>;
