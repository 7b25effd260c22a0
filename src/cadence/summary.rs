//! Wall-clock summary trigger and the summary payload.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::error::{CadenceError, Result};
use crate::network::Network;
use crate::persistence::{Metric, SummaryWriter};

pub const TOTAL_LOSS_SUMMARY: &str = "macro_loss/total_loss";

/// Fires when more than `frequency` has passed since the last firing.
#[derive(Debug, Clone)]
pub struct SummaryCadence {
    frequency: Duration,
    prev_summary_time: Instant,
}

impl SummaryCadence {
    /// Cadence whose clock starts now.
    pub fn new(frequency_secs: f64) -> std::result::Result<Self, CadenceError> {
        Self::starting_at(frequency_secs, Instant::now())
    }

    pub fn starting_at(
        frequency_secs: f64,
        start: Instant,
    ) -> std::result::Result<Self, CadenceError> {
        // NaN fails this check as well
        if !(frequency_secs > 0.0) || !frequency_secs.is_finite() {
            return Err(CadenceError::NonPositiveSummaryFrequency(frequency_secs));
        }
        let frequency = Duration::try_from_secs_f64(frequency_secs)
            .map_err(|_| CadenceError::SummaryFrequencyOutOfRange(frequency_secs))?;
        Ok(Self {
            frequency,
            prev_summary_time: start,
        })
    }

    pub fn frequency(&self) -> Duration {
        self.frequency
    }

    pub fn prev_summary_time(&self) -> Instant {
        self.prev_summary_time
    }

    /// True when strictly more than one period elapsed; the period restarts
    /// at `now`.
    pub fn should_summarize(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.prev_summary_time);
        if elapsed > self.frequency {
            self.prev_summary_time = now;
            true
        } else {
            false
        }
    }
}

/// Summary path of a parameter name: `encoder.fc.weight` → `encoder/fc/weight`
pub fn parameter_path(name: &str) -> String {
    name.replace('.', "/")
}

/// Emit one full summary at `step_count`.
///
/// Writes the total loss, each named loss, scalar metrics (images go to the
/// image sink) and the L2 norm of every network parameter and, when
/// present, of its gradient.
pub fn write_summary_payload(
    writer: &mut dyn SummaryWriter,
    network: &dyn Network,
    total_loss: f64,
    losses: &BTreeMap<String, f64>,
    metrics: &BTreeMap<String, Metric>,
    step_count: u64,
) -> Result<()> {
    writer.add_scalar(TOTAL_LOSS_SUMMARY, total_loss, step_count)?;

    for (name, loss) in losses {
        writer.add_scalar(&format!("loss/{name}"), *loss, step_count)?;
    }

    for (name, metric) in metrics {
        match metric {
            Metric::Scalar(value) => {
                writer.add_scalar(&format!("metric/{name}"), *value, step_count)?
            }
            Metric::Image(image) => writer.add_image(name, image, step_count)?,
        }
    }

    for param in network.named_parameters() {
        let path = parameter_path(&param.name);
        writer.add_scalar(&path, param.norm(), step_count)?;
        if let Some(grad_norm) = param.grad_norm() {
            writer.add_scalar(&format!("{path}.grad"), grad_norm, step_count)?;
        }
    }

    writer.flush()
}
