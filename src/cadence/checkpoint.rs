//! Step-count driven checkpoint trigger.

use crate::error::CadenceError;

/// Fires once every `epoch_len` environment steps.
///
/// The threshold only ever moves forward: each firing adds `epoch_len`, and
/// a resumed run skips every threshold at or below its starting step count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointCadence {
    epoch_len: u64,
    next_save_step: u64,
}

impl CheckpointCadence {
    /// Cadence whose first save fires on the first check.
    pub fn new(epoch_len: u64) -> Result<Self, CadenceError> {
        Self::starting_at(epoch_len, 0)
    }

    /// Cadence with an explicit first threshold.
    pub fn starting_at(epoch_len: u64, next_save_step: u64) -> Result<Self, CadenceError> {
        if epoch_len == 0 {
            return Err(CadenceError::ZeroEpochLen(epoch_len));
        }
        Ok(Self {
            epoch_len,
            next_save_step,
        })
    }

    pub fn epoch_len(&self) -> u64 {
        self.epoch_len
    }

    pub fn next_save_step(&self) -> u64 {
        self.next_save_step
    }

    /// True when `step_count` reached the threshold; advances it by one
    /// epoch. Fires at most once per call even if several epochs were
    /// crossed.
    pub fn should_save(&mut self, step_count: u64) -> bool {
        if step_count < self.next_save_step {
            return false;
        }
        self.next_save_step = self.next_save_step.saturating_add(self.epoch_len);
        true
    }

    /// Move the threshold past `initial_count` without firing.
    ///
    /// No-op for a fresh run (`initial_count == 0`) or when the threshold is
    /// already ahead.
    pub fn fast_forward(&mut self, initial_count: u64) {
        if initial_count == 0 || self.next_save_step > initial_count {
            return;
        }
        let epochs = (initial_count - self.next_save_step) / self.epoch_len + 1;
        self.next_save_step = self
            .next_save_step
            .saturating_add(epochs.saturating_mul(self.epoch_len));
    }
}
