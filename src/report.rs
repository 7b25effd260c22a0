//! Progress Reporting
//!
//! Turns the rewards of episodes completed on a step into one log line with
//! the mean reward and step throughput. Distributed runs also report the
//! rank and both the global (all processes) and local (this process) rates.

use std::time::{Duration, Instant};
use tracing::info;

use crate::episode::mean;

/// Who is reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportContext {
    /// Single-process run
    #[default]
    Single,
    /// One process of a distributed run
    Distributed { rank: usize },
}

impl ReportContext {
    pub fn from_rank(rank: Option<usize>) -> Self {
        rank.map_or(Self::Single, |rank| Self::Distributed { rank })
    }

    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Single => None,
            Self::Distributed { rank } => Some(*rank),
        }
    }
}

/// Step counts for one report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSnapshot {
    pub global_step_count: u64,
    pub local_step_count: u64,
    /// Step count this process started from (nonzero on resume)
    pub initial_step_count: u64,
}

impl StepSnapshot {
    pub fn single(step_count: u64, initial_step_count: u64) -> Self {
        Self {
            global_step_count: step_count,
            local_step_count: step_count,
            initial_step_count,
        }
    }
}

/// Formats and logs reward/throughput lines.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    start_time: Instant,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// Reporter whose throughput clock starts now
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start_time: Instant) -> Self {
        Self { start_time }
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Restart the throughput clock
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }

    /// Log the mean of `completed_rewards` with throughput.
    ///
    /// Returns `None` and logs nothing when no episode completed.
    pub fn report(
        &self,
        completed_rewards: &[f64],
        steps: StepSnapshot,
        context: ReportContext,
    ) -> Option<f64> {
        let (mean_reward, line) =
            self.render(completed_rewards, steps, context, self.start_time.elapsed())?;
        info!(target: "tally::progress", "{}", line);
        Some(mean_reward)
    }

    /// Build the report line for a given elapsed time without logging it.
    pub fn render(
        &self,
        completed_rewards: &[f64],
        steps: StepSnapshot,
        context: ReportContext,
        elapsed: Duration,
    ) -> Option<(f64, String)> {
        let mean_reward = mean(completed_rewards)?;
        let secs = elapsed.as_secs_f64();
        let local_rate = rate(steps.local_step_count, steps.initial_step_count, secs);

        let line = match context {
            ReportContext::Single => format!(
                "STEP: {} REWARD: {} STEP/S: {:.2}",
                steps.global_step_count, mean_reward, local_rate
            ),
            ReportContext::Distributed { rank } => format!(
                "RANK: {} GLOBAL STEP: {} REWARD: {} GLOBAL STEP/S: {:.2} LOCAL STEP/S: {:.2}",
                rank,
                steps.global_step_count,
                mean_reward,
                rate(steps.global_step_count, steps.initial_step_count, secs),
                local_rate
            ),
        };
        Some((mean_reward, line))
    }
}

fn rate(step_count: u64, initial_step_count: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    step_count.saturating_sub(initial_step_count) as f64 / secs
}
