//! Configuration system for bunkplan.
//!
//! Solver tunables live in a fixed, typed [`SolverSettings`] struct with
//! documented defaults. Settings load from TOML or YAML files, or from the
//! flat dotted key/value entries the external configuration store exposes.
//! Unknown keys never abort a solve: they are logged and ignored at this
//! boundary, and absent keys resolve to the defaults.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use bunkplan_config::SolverSettings;
//!
//! let settings = SolverSettings::from_toml_str(r#"
//!     [solver]
//!     time_limit_seconds = 20
//!
//!     [objective]
//!     second_request_multiplier = 4
//! "#).unwrap();
//!
//! assert_eq!(settings.solver.time_limit_seconds, 20);
//! assert_eq!(settings.objective.second_request_multiplier, 4);
//! // Absent keys keep their defaults.
//! assert_eq!(settings.objective.first_request_multiplier, 10);
//! ```
//!
//! Use defaults when the file is missing:
//!
//! ```
//! use bunkplan_config::SolverSettings;
//!
//! let settings = SolverSettings::load("solver.toml").unwrap_or_default();
//! assert_eq!(settings.constraint.unsatisfied_camper_penalty, 1000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("setting {key} expects a {expected} value")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A typed value from the external configuration store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

/// Main solver settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverSettings {
    /// Hard-constraint toggles and penalties.
    pub constraint: ConstraintSettings,

    /// Diminishing-returns objective multipliers.
    pub objective: ObjectiveSettings,

    /// Search budget and reproducibility.
    pub solver: SearchSettings,
}

impl SolverSettings {
    /// Creates settings with every field at its documented default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses settings from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Builds settings from flat dotted key/value entries, the shape the
    /// external configuration store delivers.
    ///
    /// Unknown keys are logged at `warn` and skipped; absent keys keep
    /// their defaults. A value of the wrong type for a known key is an
    /// error: that is a broken store record, not a missing one.
    pub fn from_entries<K, I>(entries: I) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, SettingValue)>,
    {
        let mut settings = Self::default();
        for (key, value) in entries {
            settings.apply_entry(key.as_ref(), value)?;
        }
        Ok(settings)
    }

    fn apply_entry(&mut self, key: &str, value: SettingValue) -> Result<(), ConfigError> {
        fn as_bool(key: &str, v: SettingValue) -> Result<bool, ConfigError> {
            match v {
                SettingValue::Bool(b) => Ok(b),
                SettingValue::Int(_) => Err(ConfigError::TypeMismatch {
                    key: key.to_string(),
                    expected: "boolean",
                }),
            }
        }
        fn as_int(key: &str, v: SettingValue) -> Result<i64, ConfigError> {
            match v {
                SettingValue::Int(i) => Ok(i),
                SettingValue::Bool(_) => Err(ConfigError::TypeMismatch {
                    key: key.to_string(),
                    expected: "integer",
                }),
            }
        }

        match key {
            "constraint.grade_adjacency_enabled" => {
                self.constraint.grade_adjacency_enabled = as_bool(key, value)?;
            }
            "constraint.unsatisfied_camper_penalty" => {
                self.constraint.unsatisfied_camper_penalty = as_int(key, value)?;
            }
            "objective.first_request_multiplier" => {
                self.objective.first_request_multiplier = as_int(key, value)?;
            }
            "objective.second_request_multiplier" => {
                self.objective.second_request_multiplier = as_int(key, value)?;
            }
            "objective.additional_request_multiplier" => {
                self.objective.additional_request_multiplier = as_int(key, value)?;
            }
            "solver.time_limit_seconds" => {
                self.solver.time_limit_seconds = as_int(key, value)? as u64;
            }
            "solver.unimproved_seconds_limit" => {
                self.solver.unimproved_seconds_limit = Some(as_int(key, value)? as u64);
            }
            "solver.step_limit" => {
                self.solver.step_limit = Some(as_int(key, value)? as u64);
            }
            "solver.random_seed" => {
                self.solver.random_seed = as_int(key, value)? as u64;
            }
            unknown => {
                warn!(event = "unknown_setting", key = unknown, "ignoring setting");
            }
        }
        Ok(())
    }

    /// Checks cross-field invariants.
    ///
    /// The multipliers must be monotonically non-increasing and
    /// non-negative, and the unsatisfied-camper penalty positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let o = &self.objective;
        if o.additional_request_multiplier < 0 {
            return Err(ConfigError::Invalid(
                "objective multipliers must be non-negative".to_string(),
            ));
        }
        if o.first_request_multiplier < o.second_request_multiplier
            || o.second_request_multiplier < o.additional_request_multiplier
        {
            return Err(ConfigError::Invalid(format!(
                "objective multipliers must be non-increasing, got {} >= {} >= {}",
                o.first_request_multiplier,
                o.second_request_multiplier,
                o.additional_request_multiplier
            )));
        }
        if self.constraint.unsatisfied_camper_penalty <= 0 {
            return Err(ConfigError::Invalid(
                "constraint.unsatisfied_camper_penalty must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the search time limit.
    pub fn with_time_limit_seconds(mut self, seconds: u64) -> Self {
        self.solver.time_limit_seconds = seconds;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.solver.random_seed = seed;
        self
    }

    /// Sets the objective multiplier table.
    pub fn with_multipliers(mut self, first: i64, second: i64, additional: i64) -> Self {
        self.objective.first_request_multiplier = first;
        self.objective.second_request_multiplier = second;
        self.objective.additional_request_multiplier = additional;
        self
    }

    /// Returns the search time limit as a Duration.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.solver.time_limit_seconds)
    }

    /// Returns the unimproved time limit as a Duration, if configured.
    pub fn unimproved_time_limit(&self) -> Option<Duration> {
        self.solver.unimproved_seconds_limit.map(Duration::from_secs)
    }
}

/// Hard-constraint toggles and penalties.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ConstraintSettings {
    /// Whether the grade adjacency rule is enforced.
    pub grade_adjacency_enabled: bool,

    /// Soft penalty charged once per camper whose requests all go
    /// unsatisfied. Large enough by default to dominate the multiplier
    /// terms, so spreading satisfaction across campers wins.
    pub unsatisfied_camper_penalty: i64,
}

impl Default for ConstraintSettings {
    fn default() -> Self {
        Self {
            grade_adjacency_enabled: true,
            unsatisfied_camper_penalty: 1000,
        }
    }
}

/// Diminishing-returns objective multipliers.
///
/// A camper's satisfied requests are ranked by priority; the first is
/// scaled by `first_request_multiplier`, the second by
/// `second_request_multiplier`, and every further one by
/// `additional_request_multiplier`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ObjectiveSettings {
    pub first_request_multiplier: i64,
    pub second_request_multiplier: i64,
    pub additional_request_multiplier: i64,
}

impl Default for ObjectiveSettings {
    fn default() -> Self {
        Self {
            first_request_multiplier: 10,
            second_request_multiplier: 5,
            additional_request_multiplier: 1,
        }
    }
}

impl ObjectiveSettings {
    /// Returns the multiplier for the satisfied request at `position`
    /// (0-based) in a camper's priority ranking.
    pub fn multiplier_for_position(&self, position: usize) -> i64 {
        match position {
            0 => self.first_request_multiplier,
            1 => self.second_request_multiplier,
            _ => self.additional_request_multiplier,
        }
    }
}

/// Search budget and reproducibility.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SearchSettings {
    /// Hard wall-clock budget in seconds.
    pub time_limit_seconds: u64,

    /// Optional early stop after this many seconds without improvement.
    pub unimproved_seconds_limit: Option<u64>,

    /// Optional cap on local search steps. Unlike the wall clock this is
    /// machine-independent, so step-bounded solves reproduce exactly.
    pub step_limit: Option<u64>,

    /// Seed for the search RNG; identical inputs and seed give identical
    /// solutions.
    pub random_seed: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            time_limit_seconds: 30,
            unimproved_seconds_limit: None,
            step_limit: None,
            random_seed: 0,
        }
    }
}
