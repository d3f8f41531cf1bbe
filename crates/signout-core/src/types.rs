//! Element and signout token types
//!
//! The engine is generic over [`BatchItem`] and [`LockToken`]; the concrete
//! [`ElementCoordinate`] and [`SignoutToken`] model the source-control system's
//! element locations and change-justification fields.

use std::{fmt, hash::Hash, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{Error, Result};

/// Maximum length of a change-control identifier.
pub const MAX_CCID_LEN: usize = 12;

/// Maximum length of a signout comment.
pub const MAX_COMMENT_LEN: usize = 40;

// ═══════════════════════════════════════════════════════════════════════════
// TRAITS
// ═══════════════════════════════════════════════════════════════════════════

/// Anything the engine can carry through a batch.
///
/// Items are compared by value and displayed by name when the operator is
/// asked whether to override a signout.
pub trait BatchItem: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static {}

impl<T> BatchItem for T where
    T: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static
{
}

/// Credentials or metadata required to acquire a signout.
pub trait LockToken: Send + Sync {
    /// Reject a token that can never be accepted by the remote system.
    fn validate(&self) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// ELEMENT COORDINATE
// ═══════════════════════════════════════════════════════════════════════════

/// Map stage of an element location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
pub enum StageNumber {
    #[strum(to_string = "1")]
    One,
    #[strum(to_string = "2")]
    Two,
}

impl TryFrom<u8> for StageNumber {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(Error::InvalidElement(format!(
                "stage number must be 1 or 2, got {other}"
            ))),
        }
    }
}

/// Fully qualified location of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementCoordinate {
    environment: String,
    stage: StageNumber,
    system: String,
    subsystem: String,
    element_type: String,
    name: String,
}

impl ElementCoordinate {
    /// Build a coordinate, upper-casing each segment.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidElement` if a segment is empty, contains `/` or
    /// whitespace, or the stage number is not 1 or 2.
    pub fn new(
        environment: &str,
        stage: u8,
        system: &str,
        subsystem: &str,
        element_type: &str,
        name: &str,
    ) -> Result<Self> {
        Ok(Self {
            environment: segment("environment", environment)?,
            stage: StageNumber::try_from(stage)?,
            system: segment("system", system)?,
            subsystem: segment("subsystem", subsystem)?,
            element_type: segment("type", element_type)?,
            name: segment("element name", name)?,
        })
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    #[must_use]
    pub const fn stage(&self) -> StageNumber {
        self.stage
    }

    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    #[must_use]
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn segment(label: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidElement(format!("{label} cannot be empty")));
    }
    if trimmed.contains('/') || trimmed.contains(char::is_whitespace) {
        return Err(Error::InvalidElement(format!(
            "{label} '{trimmed}' cannot contain '/' or whitespace"
        )));
    }
    Ok(trimmed.to_uppercase())
}

impl fmt::Display for ElementCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.environment, self.stage, self.system, self.subsystem, self.element_type, self.name
        )
    }
}

impl FromStr for ElementCoordinate {
    type Err = Error;

    /// Parse `ENV/STAGE/SYSTEM/SUBSYSTEM/TYPE/NAME`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [environment, stage, system, subsystem, element_type, name] => {
                let stage = stage.trim().parse::<u8>().map_err(|e| {
                    Error::InvalidElement(format!("stage number '{stage}' is not a number: {e}"))
                })?;
                Self::new(environment, stage, system, subsystem, element_type, name)
            }
            _ => Err(Error::InvalidElement(format!(
                "expected ENV/STAGE/SYSTEM/SUBSYSTEM/TYPE/NAME, got '{s}' ({} segments)",
                parts.len()
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SIGNOUT TOKEN
// ═══════════════════════════════════════════════════════════════════════════

/// Change-justification fields sent with every signout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignoutToken {
    pub ccid: String,
    pub comment: String,
}

impl SignoutToken {
    /// Build a token and validate it immediately.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLockToken` if either field is out of bounds.
    pub fn new(ccid: impl Into<String>, comment: impl Into<String>) -> Result<Self> {
        let token = Self {
            ccid: ccid.into(),
            comment: comment.into(),
        };
        token.validate()?;
        Ok(token)
    }
}

impl LockToken for SignoutToken {
    fn validate(&self) -> Result<()> {
        if self.ccid.trim().is_empty() {
            return Err(Error::InvalidLockToken("CCID is required".into()));
        }
        if self.ccid.contains(char::is_whitespace) {
            return Err(Error::InvalidLockToken(format!(
                "CCID '{}' cannot contain whitespace",
                self.ccid
            )));
        }
        if self.ccid.chars().count() > MAX_CCID_LEN {
            return Err(Error::InvalidLockToken(format!(
                "CCID cannot exceed {MAX_CCID_LEN} characters"
            )));
        }
        if self.comment.trim().is_empty() {
            return Err(Error::InvalidLockToken("comment is required".into()));
        }
        if self.comment.chars().count() > MAX_COMMENT_LEN {
            return Err(Error::InvalidLockToken(format!(
                "comment cannot exceed {MAX_COMMENT_LEN} characters"
            )));
        }
        Ok(())
    }
}
