use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub distributed: DistributedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of environments stepped in lockstep
    #[serde(default = "default_nb_env")]
    pub nb_env: usize,
    /// Base seed; environment `i` is seeded with `seed + i`
    #[serde(default)]
    pub seed: u64,
    /// Stop training once the step count reaches this value
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Lockstep iterations per learner update
    #[serde(default = "default_rollout_len")]
    pub rollout_len: usize,
    /// Root for checkpoints, summaries and eval.csv
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Step count to resume from (0 for a fresh run)
    #[serde(default)]
    pub initial_step_count: u64,
}

fn default_nb_env() -> usize {
    8
}

fn default_max_steps() -> u64 {
    100_000
}

fn default_rollout_len() -> usize {
    20
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("runs/default")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            nb_env: default_nb_env(),
            seed: 0,
            max_steps: default_max_steps(),
            rollout_len: default_rollout_len(),
            log_dir: default_log_dir(),
            initial_step_count: 0,
        }
    }
}

/// Checkpoint and summary timing. Validated when the scheduler is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Environment steps between checkpoints
    #[serde(default = "default_epoch_len")]
    pub epoch_len: u64,
    /// Minimum seconds between summary writes
    #[serde(default = "default_summary_frequency")]
    pub summary_frequency_secs: f64,
}

fn default_epoch_len() -> u64 {
    10_000
}

fn default_summary_frequency() -> f64 {
    10.0
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            epoch_len: default_epoch_len(),
            summary_frequency_secs: default_summary_frequency(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributedConfig {
    /// Rank of this process; unset for single-process runs
    #[serde(default)]
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for the daily log file; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("session.nb_env", default_nb_env() as i64)?
            .set_default("cadence.epoch_len", default_epoch_len())?
            .set_default("cadence.summary_frequency_secs", default_summary_frequency())?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/cluster.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TALLY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TALLY_SESSION__NB_ENV, etc.)
            .add_source(
                Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Check values that would make a session meaningless
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.session.nb_env == 0 {
            errors.push("session.nb_env must be positive".to_string());
        }

        if self.session.rollout_len == 0 {
            errors.push("session.rollout_len must be positive".to_string());
        }

        if self.session.initial_step_count > self.session.max_steps {
            errors.push(format!(
                "session.initial_step_count ({}) is past session.max_steps ({})",
                self.session.initial_step_count, self.session.max_steps
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
