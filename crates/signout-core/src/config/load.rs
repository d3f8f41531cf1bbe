//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! This module handles loading configuration from:
//! 1. Built-in defaults
//! 2. Global config: ~/.config/signout/config.toml
//! 3. Project config: .signout/config.toml
//! 4. Environment variables: SIGNOUT_*
//!
//! It also adapts loaded settings to the engine's collaborator traits.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use super::types::{Config, ConfigLayer, OverridePolicy};
use crate::{
    collaborators::{ConcurrencyConfig, FixedDecision, InteractiveDecision},
    prompt::TerminalPrompt,
    Error, Result,
};

/// Overrides `concurrency.max_parallel_requests`.
pub const ENV_MAX_PARALLEL_REQUESTS: &str = "SIGNOUT_MAX_PARALLEL_REQUESTS";

/// Overrides `signout.override_policy`.
pub const ENV_OVERRIDE_POLICY: &str = "SIGNOUT_OVERRIDE_POLICY";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy (immutable functional pattern)
///
/// # Errors
///
/// Returns error if:
/// - Config file is malformed TOML
/// - Config values fail validation
pub fn load_config() -> Result<Config> {
    let config = Config::default();

    let config = match global_config_path() {
        Some(global_path) if global_path.exists() => config.merge(load_toml_file(&global_path)?),
        _ => config,
    };

    let project_path = project_config_path()?;
    let config = if project_path.exists() {
        config.merge(load_toml_file(&project_path)?)
    } else {
        config
    };

    let config = config.apply_env_vars()?;
    config.validate()?;
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "signout")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".signout/config.toml"))
        .map_err(|e| Error::io_error(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file as a layer; keys the file omits stay `None`
///
/// # Errors
///
/// Returns error if:
/// - Path is a directory instead of a file
/// - File cannot be read
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<ConfigLayer> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io_error(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply environment variable overrides - immutable pattern
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(ENV_MAX_PARALLEL_REQUESTS) {
            self.concurrency.max_parallel_requests = value.trim().parse().map_err(|e| {
                Error::invalid_config(format!("Invalid {ENV_MAX_PARALLEL_REQUESTS} value: {e}"))
            })?;
        }

        if let Ok(value) = std::env::var(ENV_OVERRIDE_POLICY) {
            self.signout.override_policy = OverridePolicy::from_str(value.trim()).map_err(|e| {
                Error::invalid_config(format!(
                    "Invalid {ENV_OVERRIDE_POLICY} value '{value}': {e} (expected prompt, always or never)"
                ))
            })?;
        }

        Ok(self)
    }

    /// Build the override decision collaborator this configuration asks for.
    #[must_use]
    pub fn decision(&self) -> Arc<dyn InteractiveDecision> {
        match self.signout.override_policy {
            OverridePolicy::Prompt => Arc::new(TerminalPrompt::stdio()),
            OverridePolicy::Always => Arc::new(FixedDecision::accept()),
            OverridePolicy::Never => Arc::new(FixedDecision::decline()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONCURRENCY SOURCES
// ═══════════════════════════════════════════════════════════════════════════

impl ConcurrencyConfig for Config {
    fn max_concurrency(&self) -> Result<i64> {
        self.validate()?;
        Ok(self.concurrency.max_parallel_requests)
    }
}

/// Settings file re-read on every batch, so edits apply without a restart.
///
/// A missing file yields the defaults; an unreadable or invalid one is an
/// error, which the engine answers with the default ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            Ok(Config::default().merge(load_toml_file(&self.path)?))
        } else {
            Ok(Config::default())
        }
    }
}

impl ConcurrencyConfig for SettingsFile {
    fn max_concurrency(&self) -> Result<i64> {
        self.load()?.max_concurrency()
    }
}
