//! Vectorised environment interface.

use super::info::StepInfo;
use crate::error::{ensure_batch_len, Result};

/// Result of stepping every slot of a batch once
#[derive(Debug, Clone)]
pub struct StepBatch<O> {
    /// Next observation per slot (reset observation for slots that just finished)
    pub observations: Vec<O>,
    /// Reward per slot
    pub rewards: Vec<f64>,
    /// Raw terminal flag per slot
    pub terminals: Vec<bool>,
    /// Metadata per slot, empty when the env reported none
    pub infos: Vec<StepInfo>,
}

impl<O> StepBatch<O> {
    pub fn new(
        observations: Vec<O>,
        rewards: Vec<f64>,
        terminals: Vec<bool>,
        infos: Vec<StepInfo>,
    ) -> Self {
        Self {
            observations,
            rewards,
            terminals,
            infos,
        }
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Check every per-slot vector against the batch size.
    pub fn validate(&self, nb_env: usize) -> Result<()> {
        ensure_batch_len("observations", nb_env, self.observations.len())?;
        ensure_batch_len("rewards", nb_env, self.rewards.len())?;
        ensure_batch_len("terminals", nb_env, self.terminals.len())?;
        ensure_batch_len("infos", nb_env, self.infos.len())
    }
}

/// A fixed-size batch of environments stepped in lockstep.
///
/// `step` blocks until every slot has advanced once. How the slots run
/// (in-process, subprocesses, remote) is up to the implementation.
pub trait EnvironmentBatch {
    type Observation: Clone;
    type Action: Clone;

    /// Number of slots; fixed for the lifetime of the batch
    fn nb_env(&self) -> usize;

    /// Reset every slot and return the initial observations
    fn reset(&mut self) -> Result<Vec<Self::Observation>>;

    /// Step every slot with its action
    fn step(&mut self, actions: &[Self::Action]) -> Result<StepBatch<Self::Observation>>;
}
