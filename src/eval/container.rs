//! Evaluation of every checkpoint in a training log directory.

use std::path::Path;
use tracing::{info, warn};

use super::driver::{EvalOutcome, EvaluationDriver};
use crate::env::EnvironmentBatch;
use crate::error::Result;
use crate::network::LoadsCheckpoint;
use crate::persistence::{EvalLog, EvalRecord, LogDir};
use crate::policy::Policy;

/// Best epoch of a whole evaluation run
#[derive(Debug, Clone, PartialEq)]
pub struct BestEpoch {
    pub epoch_id: u64,
    pub mean: f64,
}

/// Walks the checkpoint epochs of a run and scores each model file.
///
/// Every model gets a fresh evaluation pass. Per epoch, the model with the
/// highest mean is selected (a later file wins a tie) and one line is
/// appended to `eval.csv`.
pub struct EvalContainer<E, P> {
    log_dir: LogDir,
    eval_log: EvalLog,
    env: E,
    policy: P,
}

impl<E, P> EvalContainer<E, P>
where
    E: EnvironmentBatch,
    P: Policy<Observation = E::Observation, Action = E::Action> + LoadsCheckpoint,
{
    pub fn new(log_dir: LogDir, env: E, policy: P) -> Self {
        let eval_log = EvalLog::new(log_dir.eval_path());
        Self {
            log_dir,
            eval_log,
            env,
            policy,
        }
    }

    pub fn log_dir(&self) -> &LogDir {
        &self.log_dir
    }

    /// Load one model file and run a full pass with it.
    pub fn evaluate_model(&mut self, path: &Path) -> Result<EvalOutcome> {
        self.policy.load_checkpoint(path)?;
        EvaluationDriver::new(&mut self.env, &mut self.policy).run()
    }

    /// Best model of one epoch, or `None` when the epoch holds no model.
    pub fn evaluate_epoch(&mut self, epoch_id: u64) -> Result<Option<EvalRecord>> {
        let mut best: Option<EvalRecord> = None;

        for path in self.log_dir.network_paths_at_epoch(epoch_id)? {
            let outcome = self.evaluate_model(&path)?;
            let is_best = best
                .as_ref()
                .map_or(true, |record| outcome.mean >= record.best_mean);
            if is_best {
                best = Some(EvalRecord {
                    epoch_id,
                    best_mean: outcome.mean,
                    best_std: outcome.std_dev,
                    selected_model: file_name(&path),
                });
            }
        }

        Ok(best)
    }

    /// Evaluate every epoch in order and return the best one.
    pub fn run(&mut self) -> Result<Option<BestEpoch>> {
        let mut overall: Option<BestEpoch> = None;

        for epoch_id in self.log_dir.epochs()? {
            let Some(record) = self.evaluate_epoch(epoch_id)? else {
                warn!(epoch_id, "No model files in epoch, skipping");
                continue;
            };

            info!(
                "EPOCH_ID: {} MEAN_REWARD: {} STD_DEV: {} SELECTED_MODEL: {}",
                record.epoch_id, record.best_mean, record.best_std, record.selected_model
            );
            self.eval_log.append(&record)?;

            let is_best = overall
                .as_ref()
                .map_or(true, |best| record.best_mean >= best.mean);
            if is_best {
                overall = Some(BestEpoch {
                    epoch_id,
                    mean: record.best_mean,
                });
            }
        }

        match &overall {
            Some(best) => info!(
                "*** EPOCH_ID: {} MEAN_REWARD: {} ***",
                best.epoch_id, best.mean
            ),
            None => warn!("No checkpoints found in {:?}", self.log_dir.root()),
        }
        Ok(overall)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
