//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/signout/config.toml
//! 3. Project config: .signout/config.toml
//! 4. Environment variables: SIGNOUT_*
//!
//! # Example Config
//!
//! ```toml
//! [concurrency]
//! max_parallel_requests = 8
//!
//! [signout]
//! override_policy = "never"
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Applying file layers over a config
//! - `validate`: Range checks

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;

pub use load::{
    global_config_path, load_config, load_toml_file, project_config_path, SettingsFile,
    ENV_MAX_PARALLEL_REQUESTS, ENV_OVERRIDE_POLICY,
};
pub use types::{
    ConcurrencyLayer, ConcurrencySettings, Config, ConfigLayer, OverridePolicy, SignoutLayer,
    SignoutSettings,
};
pub use validate::{MAX_PARALLEL_REQUESTS, MIN_PARALLEL_REQUESTS};
