//! Engine configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `QXMAP_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RouteError, RouteResult};
use crate::fixed5::Variant;

/// Tunables for table building and placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Placement candidates whose estimated cost is within this distance of
    /// the best estimate are expanded and compared by real gate count.
    #[serde(default = "default_placement_slack")]
    pub placement_slack: u64,

    /// Devices with at most this many qubits get exhaustive placement;
    /// larger ones use the greedy heuristic.
    #[serde(default = "default_exhaustive_limit")]
    pub exhaustive_limit: usize,

    /// Upper bound on relay moves per candidate path while building a
    /// routing table. Unbounded when absent.
    #[serde(default)]
    pub max_relay_moves: Option<usize>,

    /// Rewrite style of the fixed 5-qubit transform.
    #[serde(default)]
    pub fixed5_variant: Variant,
}

fn default_placement_slack() -> u64 {
    10
}

fn default_exhaustive_limit() -> usize {
    5
}

/// Hard cap on exhaustive placement: 8 physical qubits already mean 40320
/// full permutations.
const MAX_EXHAUSTIVE_LIMIT: usize = 8;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement_slack: default_placement_slack(),
            exhaustive_limit: default_exhaustive_limit(),
            max_relay_moves: None,
            fixed5_variant: Variant::default(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> RouteResult<Self> {
        let config: EngineConfig = serde_yaml_ng::from_str(text)
            .map_err(|e| RouteError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RouteResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| RouteError::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> RouteResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `QXMAP_*` environment variables.
    pub fn merge_env(self) -> RouteResult<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from variables supplied by `lookup`.
    ///
    /// Recognized keys: `QXMAP_PLACEMENT_SLACK`, `QXMAP_EXHAUSTIVE_LIMIT`,
    /// `QXMAP_MAX_RELAY_MOVES` (`none` clears the bound) and
    /// `QXMAP_FIXED5_VARIANT`.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> RouteResult<Self> {
        if let Some(v) = lookup("QXMAP_PLACEMENT_SLACK") {
            self.placement_slack = parse_var("QXMAP_PLACEMENT_SLACK", &v)?;
        }
        if let Some(v) = lookup("QXMAP_EXHAUSTIVE_LIMIT") {
            self.exhaustive_limit = parse_var("QXMAP_EXHAUSTIVE_LIMIT", &v)?;
        }
        if let Some(v) = lookup("QXMAP_MAX_RELAY_MOVES") {
            self.max_relay_moves = if v.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_var("QXMAP_MAX_RELAY_MOVES", &v)?)
            };
        }
        if let Some(v) = lookup("QXMAP_FIXED5_VARIANT") {
            self.fixed5_variant = v.parse()?;
        }
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RouteResult<()> {
        if self.exhaustive_limit > MAX_EXHAUSTIVE_LIMIT {
            return Err(RouteError::InvalidConfiguration(format!(
                "exhaustive_limit {} exceeds the maximum of {MAX_EXHAUSTIVE_LIMIT}",
                self.exhaustive_limit
            )));
        }
        if self.max_relay_moves == Some(0) {
            return Err(RouteError::InvalidConfiguration(
                "max_relay_moves must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> RouteResult<T> {
    value.trim().parse().map_err(|_| {
        RouteError::InvalidConfiguration(format!("{key}: invalid value '{value}'"))
    })
}
