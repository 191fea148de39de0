//! Configuration loading and typed config structures for the Foobar Factory.
//!
//! The configuration lives in `foobar-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty file (or no
//! file at all) yields a runnable simulation: two workers, an empty
//! ledger, the smart autopilot, and a target of 30 workers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use foobar_ledger::ResourceLedger;
use foobar_types::Resource;

/// Environment variable overriding `world.seed`.
pub const ENV_SEED: &str = "FOOBAR_SEED";

/// Environment variable overriding `world.tick_interval_ms`.
pub const ENV_TICK_INTERVAL_MS: &str = "FOOBAR_TICK_INTERVAL_MS";

/// Environment variable overriding `logging.dir`.
pub const ENV_LOG_DIR: &str = "LOG_DIR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// The environment variable name.
        name: &'static str,
        /// The raw value found.
        value: String,
    },

    /// A value is syntactically valid but unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `foobar-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and pacing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial workers and resources.
    #[serde(default)]
    pub factory: FactoryConfig,

    /// When the run stops.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Which decision strategy drives the factory.
    #[serde(default)]
    pub pilot: PilotConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `FOOBAR_SEED` overrides `world.seed`
    /// - `FOOBAR_TICK_INTERVAL_MS` overrides `world.tick_interval_ms`
    /// - `LOG_DIR` overrides `logging.dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply `FOOBAR_*` and `LOG_DIR` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a set variable does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a present value does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = parse_override(&lookup, ENV_SEED)? {
            self.world.seed = Some(seed);
        }
        if let Some(interval) = parse_override(&lookup, ENV_TICK_INTERVAL_MS)? {
            self.world.tick_interval_ms = interval;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|dir| !dir.trim().is_empty()) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Check values that deserialize fine but cannot drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.factory.initial_workers == 0 {
            return Err(ConfigError::Invalid {
                reason: "factory.initial_workers must be at least 1".to_owned(),
            });
        }
        if self.simulation.target_workers == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulation.target_workers must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

fn parse_override<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_err| ConfigError::InvalidEnv { name, value })
        })
        .transpose()
}

/// Seed and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility. `None` draws a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds between ticks. 0 disables pacing.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Initial state of the factory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FactoryConfig {
    /// Number of workers at tick 0.
    #[serde(default = "default_initial_workers")]
    pub initial_workers: u32,

    /// Starting resources. Missing resources start at zero.
    #[serde(default)]
    pub starting_resources: BTreeMap<Resource, u32>,
}

impl FactoryConfig {
    /// The ledger the factory starts with.
    pub fn starting_ledger(&self) -> ResourceLedger {
        ResourceLedger::with_balances(self.starting_resources.iter().map(|(&r, &q)| (r, q)))
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            initial_workers: default_initial_workers(),
            starting_resources: BTreeMap::new(),
        }
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// The run ends once the factory owns this many workers.
    #[serde(default = "default_target_workers")]
    pub target_workers: u32,

    /// Hard stop after this many ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            target_workers: default_target_workers(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Decision strategy selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PilotConfig {
    /// Which pilot to run.
    #[serde(default)]
    pub kind: PilotKind,
}

/// The available decision strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PilotKind {
    /// Buy robots as early as possible.
    #[default]
    Smart,
    /// Stockpile everything with the two initial robots, then buy.
    Dumb,
    /// A human picks every task at the terminal.
    Interactive,
}

impl FromStr for PilotKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smart" => Ok(Self::Smart),
            "dumb" => Ok(Self::Dumb),
            "interactive" => Ok(Self::Interactive),
            other => Err(ConfigError::Invalid {
                reason: format!("unknown pilot: {other}"),
            }),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory receiving one JSON log file per run. Unset logs to
    /// stderr only.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Path of the log file for a run started at `timestamp` (Unix
    /// seconds), if a log directory is configured.
    pub fn run_log_path(&self, timestamp: i64) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("foobarfactoryrun_{timestamp}.log")))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_initial_workers() -> u32 {
    2
}

const fn default_target_workers() -> u32 {
    30
}

const fn default_max_ticks() -> u64 {
    100_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
