//! Configuration type definitions
//!
//! Pure data holders; behavior lives in the sibling modules.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Root configuration structure
///
/// Loaded from defaults → global → project → env vars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub concurrency: ConcurrencySettings,
    pub signout: SignoutSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConcurrencySettings {
    /// Maximum simultaneous remote calls per phase.
    pub max_parallel_requests: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignoutSettings {
    pub override_policy: OverridePolicy,
}

/// Who answers "override the signout?".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OverridePolicy {
    /// Ask on the terminal.
    Prompt,
    /// Always take the signout.
    Always,
    /// Never take the signout; fall back to a copy.
    Never,
}

// ═══════════════════════════════════════════════════════════════════════════
// FILE LAYERS
// ═══════════════════════════════════════════════════════════════════════════

/// What one config file actually says. `None` means the key is absent, so a
/// file can set a value back to its default over an earlier layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigLayer {
    pub concurrency: ConcurrencyLayer,
    pub signout: SignoutLayer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConcurrencyLayer {
    pub max_parallel_requests: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignoutLayer {
    pub override_policy: Option<OverridePolicy>,
}
