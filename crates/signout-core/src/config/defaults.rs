//! Default configuration values

use super::types::{ConcurrencySettings, Config, OverridePolicy, SignoutSettings};
use crate::pool::DEFAULT_CONCURRENCY;

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencySettings::default(),
            signout: SignoutSettings::default(),
        }
    }
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self {
            max_parallel_requests: i64::try_from(DEFAULT_CONCURRENCY).unwrap_or(1),
        }
    }
}

impl Default for SignoutSettings {
    fn default() -> Self {
        Self {
            override_policy: OverridePolicy::Prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.concurrency.max_parallel_requests, 4);
        assert_eq!(config.signout.override_policy, OverridePolicy::Prompt);
    }
}
