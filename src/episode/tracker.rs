//! Training-side reward tracking: accumulation, progress lines and reward
//! summaries in one place.

use super::accumulator::{Completed, RewardAccumulator};
use crate::env::StepInfo;
use crate::error::Result;
use crate::persistence::SummaryWriter;
use crate::report::{ProgressReporter, ReportContext, StepSnapshot};

/// Scalar name for the mean training reward
pub const TRAIN_REWARD_SUMMARY: &str = "reward/train";

/// Continuous-mode reward tracking for a training run.
#[derive(Debug, Clone)]
pub struct TrainingRewardTracker {
    accumulator: RewardAccumulator,
    reporter: ProgressReporter,
    context: ReportContext,
    initial_step_count: u64,
}

impl TrainingRewardTracker {
    pub fn new(nb_env: usize, context: ReportContext) -> Self {
        Self::resumed(nb_env, context, 0)
    }

    /// Tracker for a process that starts at `initial_step_count`.
    pub fn resumed(nb_env: usize, context: ReportContext, initial_step_count: u64) -> Self {
        let mut accumulator = RewardAccumulator::new(nb_env);
        accumulator.set_local_step_count(initial_step_count);
        Self {
            accumulator,
            reporter: ProgressReporter::new(),
            context,
            initial_step_count,
        }
    }

    pub fn nb_env(&self) -> usize {
        self.accumulator.nb_env()
    }

    pub fn context(&self) -> ReportContext {
        self.context
    }

    pub fn accumulator(&self) -> &RewardAccumulator {
        &self.accumulator
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    pub fn local_step_count(&self) -> u64 {
        self.accumulator.local_step_count()
    }

    pub fn initial_step_count(&self) -> u64 {
        self.initial_step_count
    }

    /// Restart the throughput clock, e.g. right before the first rollout.
    pub fn start(&mut self) {
        self.reporter.reset_timer();
    }

    pub fn ingest(
        &mut self,
        rewards: &[f64],
        terminals: &[bool],
        infos: &[StepInfo],
    ) -> Result<Completed> {
        self.accumulator.ingest(rewards, terminals, infos)
    }

    /// Log a progress line for the completed episodes.
    ///
    /// `global_step_count` is the aggregated count in distributed runs and
    /// the local count otherwise.
    pub fn log_episode_results(
        &self,
        completed_rewards: &[f64],
        global_step_count: u64,
    ) -> Option<f64> {
        let steps = StepSnapshot {
            global_step_count,
            local_step_count: self.local_step_count(),
            initial_step_count: self.initial_step_count,
        };
        self.reporter.report(completed_rewards, steps, self.context)
    }

    /// Write the mean completed reward as [`TRAIN_REWARD_SUMMARY`].
    ///
    /// Nothing is written when no episode completed.
    pub fn write_reward_summaries(
        &self,
        completed_rewards: &[f64],
        step_count: u64,
        writer: &mut dyn SummaryWriter,
    ) -> Result<Option<f64>> {
        match super::mean(completed_rewards) {
            Some(mean_reward) => {
                writer.add_scalar(TRAIN_REWARD_SUMMARY, mean_reward, step_count)?;
                Ok(Some(mean_reward))
            }
            None => Ok(None),
        }
    }
}
