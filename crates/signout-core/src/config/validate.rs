//! Configuration validation

use super::types::Config;
use crate::{Error, Result};

/// Smallest accepted `max_parallel_requests`.
pub const MIN_PARALLEL_REQUESTS: i64 = 1;

/// Largest accepted `max_parallel_requests`.
pub const MAX_PARALLEL_REQUESTS: i64 = 64;

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range
    pub fn validate(&self) -> Result<()> {
        let requests = self.concurrency.max_parallel_requests;
        if !(MIN_PARALLEL_REQUESTS..=MAX_PARALLEL_REQUESTS).contains(&requests) {
            return Err(Error::invalid_config(format!(
                "max_parallel_requests must be {MIN_PARALLEL_REQUESTS}-{MAX_PARALLEL_REQUESTS}, got {requests}"
            )));
        }
        Ok(())
    }
}
