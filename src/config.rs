//! Configuration for the spreading-activation engine.
//!
//! All parameters have defaults and can be overridden from a YAML file and
//! environment variables (priority: env var > YAML > default).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default YAML file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "spreadgram.yaml";

/// Iterative linear solver settings (activation-rate equilibrium).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Target relative residual `‖b − Ax‖ / ‖b‖`.
    pub tolerance: f64,
    /// Iteration cap. `None` means twice the system dimension, at least 100.
    pub max_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: None,
        }
    }
}

/// Spreading-gram driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadingConfig {
    /// Loose (weight) factor applied to transferred activation.
    pub loose: f64,
    /// Maximum number of synchronous update steps.
    pub max_steps: usize,
    /// Stop once the max-norm change between two steps drops below this.
    pub tolerance: f64,
}

impl Default for SpreadingConfig {
    fn default() -> Self {
        Self {
            loose: 1.0,
            max_steps: 100,
            tolerance: 1e-6,
        }
    }
}

/// Random walk with restart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Probability of teleporting back to the seed distribution at each step.
    pub restart_prob: f64,
    /// Convergence threshold on the L2 norm of successive iterates.
    pub threshold: f64,
    pub max_iterations: usize,
    /// Solve the closed form instead of iterating.
    pub analytical: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            restart_prob: 0.1,
            threshold: 1e-6,
            max_iterations: 10_000,
            analytical: false,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the per-row loops. 0 = available parallelism.
    pub workers: usize,
    /// Log thread counts and phases at `info` instead of `debug`.
    pub show_progress: bool,
    pub solver: SolverConfig,
    pub spreading: SpreadingConfig,
    pub walk: WalkConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            show_progress: false,
            solver: SolverConfig::default(),
            spreading: SpreadingConfig::default(),
            walk: WalkConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

impl EngineConfig {
    /// Load configuration from environment variables on top of defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// If `yaml_path` is None, tries [`DEFAULT_CONFIG_FILE`] in CWD. A missing
    /// or unparsable file falls back to defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_yaml(yaml_path);

        if let Some(v) = env_parse("SPREADGRAM_WORKERS") {
            config.workers = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_SHOW_PROGRESS") {
            config.show_progress = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_LOOSE") {
            config.spreading.loose = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_SOLVER_TOLERANCE") {
            config.solver.tolerance = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_SOLVER_MAX_ITERATIONS") {
            config.solver.max_iterations = Some(v);
        }
        if let Some(v) = env_parse("SPREADGRAM_RESTART_PROB") {
            config.walk.restart_prob = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_WALK_THRESHOLD") {
            config.walk.threshold = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_WALK_MAX_ITERATIONS") {
            config.walk.max_iterations = v;
        }
        if let Some(v) = env_parse("SPREADGRAM_WALK_ANALYTICAL") {
            config.walk.analytical = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn load_yaml(yaml_path: Option<&Path>) -> Self {
        let path = yaml_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("No config file at {}, using env vars / defaults", path.display());
                Self::default()
            }
        }
    }

    /// Range checks for every numeric parameter.
    pub fn validate(&self) -> Result<()> {
        if !(self.solver.tolerance > 0.0 && self.solver.tolerance.is_finite()) {
            return Err(Error::Config(format!(
                "solver.tolerance must be positive, got {}",
                self.solver.tolerance
            )));
        }
        if !self.spreading.loose.is_finite() {
            return Err(Error::Config("spreading.loose must be finite".into()));
        }
        if !(self.spreading.tolerance >= 0.0) {
            return Err(Error::Config(format!(
                "spreading.tolerance must be non-negative, got {}",
                self.spreading.tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.walk.restart_prob) {
            return Err(Error::Config(format!(
                "walk.restart_prob must lie in [0, 1], got {}",
                self.walk.restart_prob
            )));
        }
        if !(self.walk.threshold >= 0.0) {
            return Err(Error::Config(format!(
                "walk.threshold must be non-negative, got {}",
                self.walk.threshold
            )));
        }
        Ok(())
    }
}
