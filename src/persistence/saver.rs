//! Checkpoint persistence.

use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::log_dir::LogDir;
use crate::error::Result;
use crate::network::Network;

/// Persists model (and optimizer) state for a step.
pub trait Saver {
    /// Save a checkpoint and return the model file path.
    fn save(
        &mut self,
        network: &dyn Network,
        step_count: u64,
        optimizer: Option<&serde_json::Value>,
    ) -> Result<PathBuf>;
}

/// Writes checkpoints as pretty JSON into a [`LogDir`].
#[derive(Debug, Clone)]
pub struct FileSaver {
    log_dir: LogDir,
}

impl FileSaver {
    pub fn new(log_dir: LogDir) -> Self {
        Self { log_dir }
    }

    pub fn log_dir(&self) -> &LogDir {
        &self.log_dir
    }
}

impl Saver for FileSaver {
    fn save(
        &mut self,
        network: &dyn Network,
        step_count: u64,
        optimizer: Option<&serde_json::Value>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(self.log_dir.epoch_dir(step_count))?;

        let model_path = self.log_dir.model_path(step_count);
        fs::write(&model_path, serde_json::to_vec_pretty(&network.state()?)?)?;

        if let Some(state) = optimizer {
            fs::write(
                self.log_dir.optimizer_path(step_count),
                serde_json::to_vec_pretty(state)?,
            )?;
        }

        info!("Saved checkpoint to {:?}", model_path);
        Ok(model_path)
    }
}
