//! Policy Interface
//!
//! Inference-only view of an agent: batched action selection with
//! per-slot internal state (e.g. recurrent memory).

use crate::error::Result;

/// Batched, inference-only policy.
pub trait Policy {
    type Observation;
    type Action;
    /// Memory carried between steps for one slot
    type Internal: Clone;

    /// Fresh internal state for a slot starting a new episode
    fn new_internals(&self) -> Self::Internal;

    /// Select one action per slot.
    ///
    /// Returns the actions and the updated internal states, both of length
    /// `observations.len()`.
    fn act(
        &mut self,
        observations: &[Self::Observation],
        internals: &[Self::Internal],
    ) -> Result<(Vec<Self::Action>, Vec<Self::Internal>)>;

    /// Clear the memory of every slot whose episode just ended.
    fn reset_internals(&self, internals: &mut [Self::Internal], terminals: &[bool]) {
        for (internal, &terminal) in internals.iter_mut().zip(terminals) {
            if terminal {
                *internal = self.new_internals();
            }
        }
    }

    /// Internal states for a whole batch
    fn batch_internals(&self, nb_env: usize) -> Vec<Self::Internal> {
        (0..nb_env).map(|_| self.new_internals()).collect()
    }
}
