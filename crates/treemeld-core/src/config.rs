use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

const DEFAULT_SEARCH_CONFIG_YAML: &str = include_str!("../config/search.default.yaml");

/// Search and synchronization configuration for one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Exploration constant applied to the UCB bonus.
    pub c: f64,
    /// Simulations run before committing each real move.
    pub simulations_per_move: usize,
    /// Visits a link needs before a child node is created for it.
    pub expansion_threshold: u64,
    /// Hard bound on off-tree playout length.
    pub max_playout_steps: usize,
    /// Run a synchronization round every this many simulations.
    pub sync_interval: usize,
    /// How long a worker waits on a collective call before abandoning the round.
    pub sync_timeout_ms: u64,
    /// Seed for the deterministic per-worker RNG (offset by worker rank).
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            c: 1.4,
            simulations_per_move: 1000,
            expansion_threshold: 1,
            max_playout_steps: 512,
            sync_interval: 50,
            sync_timeout_ms: 2000,
            seed: 12345,
        }
    }
}

impl SearchConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SearchConfigError> {
        let config: SearchConfig = serde_yaml::from_str(yaml).map_err(SearchConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SearchConfigError> {
        let yaml = fs::read_to_string(path).map_err(SearchConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_SEARCH_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, SearchConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    fn validate(&self) -> Result<(), SearchConfigError> {
        if !self.c.is_finite() || self.c < 0.0 {
            return Err(SearchConfigError::Invalid(
                "c must be finite and >= 0".to_string(),
            ));
        }
        if self.simulations_per_move == 0 {
            return Err(SearchConfigError::Invalid(
                "simulations_per_move must be greater than 0".to_string(),
            ));
        }
        if self.max_playout_steps == 0 {
            return Err(SearchConfigError::Invalid(
                "max_playout_steps must be greater than 0".to_string(),
            ));
        }
        if self.sync_interval == 0 {
            return Err(SearchConfigError::Invalid(
                "sync_interval must be greater than 0".to_string(),
            ));
        }
        if self.sync_timeout_ms == 0 {
            return Err(SearchConfigError::Invalid(
                "sync_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for loading and validating `SearchConfig`.
#[derive(Debug)]
pub enum SearchConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for SearchConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            SearchConfigError::Yaml(err) => write!(f, "failed to parse config YAML: {err}"),
            SearchConfigError::Invalid(err) => write!(f, "invalid search config: {err}"),
        }
    }
}

impl std::error::Error for SearchConfigError {}
