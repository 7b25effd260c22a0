//! Checkpoint and summary triggers bundled with their side effects.

use std::time::Instant;
use tracing::debug;

use super::checkpoint::CheckpointCadence;
use super::summary::{write_summary_payload, SummaryCadence};
use crate::config::CadenceConfig;
use crate::error::Result;
use crate::network::Network;
use crate::persistence::{Saver, SummaryWriter};
use crate::training::LearnStep;

/// Decides when to save and when to summarise for one training session.
///
/// Both triggers are owned by the control loop; collaborators are passed
/// per call so the scheduler never holds on to the network or the sinks.
#[derive(Debug, Clone)]
pub struct CadenceScheduler {
    checkpoint: CheckpointCadence,
    summary: SummaryCadence,
}

impl CadenceScheduler {
    /// Build both triggers; fails with `DegenerateCadence` on a zero epoch
    /// length or a non-positive summary frequency.
    pub fn new(config: &CadenceConfig) -> Result<Self> {
        Ok(Self {
            checkpoint: CheckpointCadence::new(config.epoch_len)?,
            summary: SummaryCadence::new(config.summary_frequency_secs)?,
        })
    }

    pub fn from_parts(checkpoint: CheckpointCadence, summary: SummaryCadence) -> Self {
        Self {
            checkpoint,
            summary,
        }
    }

    pub fn checkpoint(&self) -> &CheckpointCadence {
        &self.checkpoint
    }

    pub fn summary(&self) -> &SummaryCadence {
        &self.summary
    }

    pub fn next_save_step(&self) -> u64 {
        self.checkpoint.next_save_step()
    }

    pub fn should_save(&mut self, step_count: u64) -> bool {
        self.checkpoint.should_save(step_count)
    }

    /// Skip save thresholds already passed before this process started.
    pub fn fast_forward(&mut self, initial_count: u64) {
        self.checkpoint.fast_forward(initial_count);
        debug!(
            initial_count,
            next_save_step = self.checkpoint.next_save_step(),
            "Checkpoint cadence fast-forwarded"
        );
    }

    pub fn should_summarize(&mut self, now: Instant) -> bool {
        self.summary.should_summarize(now)
    }

    /// Save a checkpoint when `step_count` crossed the save threshold.
    ///
    /// `optimizer` is only called when a save happens. Returns whether a
    /// save happened. Saver errors propagate.
    pub fn save_if_epoch<F>(
        &mut self,
        step_count: u64,
        network: &dyn Network,
        optimizer: F,
        saver: &mut dyn Saver,
    ) -> Result<bool>
    where
        F: FnOnce() -> Option<serde_json::Value>,
    {
        if !self.should_save(step_count) {
            return Ok(false);
        }
        let optimizer_state = optimizer();
        saver.save(network, step_count, optimizer_state.as_ref())?;
        Ok(true)
    }

    /// Write the summary payload of `learn_step` if the summary period
    /// elapsed.
    pub fn write_summaries(
        &mut self,
        learn_step: &LearnStep,
        network: &dyn Network,
        step_count: u64,
        writer: &mut dyn SummaryWriter,
    ) -> Result<bool> {
        self.write_summaries_at(Instant::now(), learn_step, network, step_count, writer)
    }

    pub fn write_summaries_at(
        &mut self,
        now: Instant,
        learn_step: &LearnStep,
        network: &dyn Network,
        step_count: u64,
        writer: &mut dyn SummaryWriter,
    ) -> Result<bool> {
        if !self.should_summarize(now) {
            return Ok(false);
        }
        write_summary_payload(
            writer,
            network,
            learn_step.total_loss,
            &learn_step.losses,
            &learn_step.metrics,
            step_count,
        )?;
        Ok(true)
    }
}
