//! Settings of the search agent.
//!
//! Loaded from a JSON file; every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MctsConfig {
    /// UCB1 exploration constant.
    #[serde(default = "default_exploration")]
    pub exploration: f64,
    /// Wall clock budget per card decision in milliseconds.
    #[serde(default = "default_budget_ms")]
    pub budget_ms: u64,
    /// Independent determinizations searched in parallel.
    #[serde(default = "default_trees")]
    pub trees: usize,
    /// Optional cap on iterations per tree, makes searches reproducible together with `seed`.
    #[serde(default)]
    pub max_iterations: Option<u64>,
    /// Base seed, tree `i` uses `seed + i`. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Push the trump decision when no trump mode is worth at least this many hand points.
    #[serde(default = "default_push_threshold")]
    pub push_threshold: i32,
}

fn default_exploration() -> f64 {
    1.0
}

fn default_budget_ms() -> u64 {
    1000
}

fn default_trees() -> usize {
    1
}

fn default_push_threshold() -> i32 {
    60
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: default_exploration(),
            budget_ms: default_budget_ms(),
            trees: default_trees(),
            max_iterations: None,
            seed: None,
            push_threshold: default_push_threshold(),
        }
    }
}

impl MctsConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MctsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            )));
        }
        if self.trees == 0 {
            return Err(ConfigError::Invalid("trees must be at least 1".to_string()));
        }
        Ok(())
    }
}
