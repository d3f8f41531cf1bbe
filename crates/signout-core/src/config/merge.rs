//! Configuration merging logic (Immutable functional pattern)
//!
//! Layers are applied in order (defaults → global → project → env). Every key
//! present in a layer wins, even when it repeats the default.

use super::types::{
    ConcurrencyLayer, ConcurrencySettings, Config, ConfigLayer, SignoutLayer, SignoutSettings,
};

impl Config {
    /// Apply a file layer on top of this config - immutable pattern
    #[must_use]
    pub fn merge(self, layer: ConfigLayer) -> Self {
        Self {
            concurrency: self.concurrency.merge(layer.concurrency),
            signout: self.signout.merge(layer.signout),
        }
    }
}

impl ConcurrencySettings {
    fn merge(self, layer: ConcurrencyLayer) -> Self {
        Self {
            max_parallel_requests: layer
                .max_parallel_requests
                .unwrap_or(self.max_parallel_requests),
        }
    }
}

impl SignoutSettings {
    fn merge(self, layer: SignoutLayer) -> Self {
        Self {
            override_policy: layer.override_policy.unwrap_or(self.override_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::OverridePolicy;
    use super::*;

    fn layer(requests: Option<i64>, policy: Option<OverridePolicy>) -> ConfigLayer {
        ConfigLayer {
            concurrency: ConcurrencyLayer {
                max_parallel_requests: requests,
            },
            signout: SignoutLayer {
                override_policy: policy,
            },
        }
    }

    #[test]
    fn test_project_overrides_global() {
        let global = layer(Some(8), Some(OverridePolicy::Never));
        let project = layer(Some(2), None);

        let merged = Config::default().merge(global).merge(project);
        assert_eq!(merged.concurrency.max_parallel_requests, 2);
        assert_eq!(merged.signout.override_policy, OverridePolicy::Never);
    }

    #[test]
    fn test_explicit_default_value_overrides_earlier_layer() {
        let global = layer(Some(8), Some(OverridePolicy::Never));
        let project = layer(Some(4), Some(OverridePolicy::Prompt));

        let merged = Config::default().merge(global).merge(project);
        assert_eq!(merged, Config::default());
    }

    #[test]
    fn test_empty_layer_keeps_self() {
        let tuned = Config::default().merge(layer(Some(12), None));
        assert_eq!(tuned.clone().merge(ConfigLayer::default()), tuned);
    }
}
