//! Analysis configuration.
//!
//! Configuration arrives as an already-read JSON document; every field is
//! optional:
//!
//! ```json
//! {
//!   "arity_policy": "suppress",
//!   "near_miss": "report",
//!   "type_names": ["attrdict"],
//!   "capwords_types": false,
//!   "patterns": [
//!     {"id": "setattr", "callee_shape": "setattr", "receiver": {"index": 0},
//!      "min_args": 3, "exact_receiver_position": true}
//!   ]
//! }
//! ```
//!
//! When `patterns` is present it replaces the built-in table wholesale.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matcher::{MutationPattern, PatternTable, TypeNames};

/// What to do with calls that match a shape but pass too few arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArityPolicy {
    /// Emit the event with reason `ArityTooLow`.
    #[default]
    Report,
    /// Drop the event.
    Suppress,
}

/// Whether calls to a mutation member under an unknown shape are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearMissPolicy {
    #[default]
    Ignore,
    /// Emit `CalleeShapeMismatch` events.
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Replacement pattern table, in match order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<MutationPattern>>,
    pub arity_policy: ArityPolicy,
    pub near_miss: NearMissPolicy,
    /// Names `@type` accepts in addition to the builtin types.
    pub type_names: Vec<String>,
    /// Let `@type` accept any CapWords name (`Model.__setattr__`).
    pub capwords_types: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            patterns: None,
            arity_policy: ArityPolicy::default(),
            near_miss: NearMissPolicy::default(),
            type_names: Vec::new(),
            capwords_types: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents (including bad
    /// callee shapes) and [`ConfigError::DuplicatePatternId`] when a custom
    /// table repeats an id.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.pattern_table()?;
        Ok(config)
    }

    /// The table to match against: the custom one if configured, otherwise
    /// the built-in table.
    pub fn pattern_table(&self) -> Result<Cow<'static, PatternTable>, ConfigError> {
        match &self.patterns {
            Some(patterns) => Ok(Cow::Owned(PatternTable::new(patterns.clone())?)),
            None => Ok(Cow::Borrowed(PatternTable::builtin())),
        }
    }

    pub fn type_names(&self) -> TypeNames<'_> {
        TypeNames::new(&self.type_names, self.capwords_types)
    }
}
