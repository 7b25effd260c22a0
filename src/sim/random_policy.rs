use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::marker::PhantomData;

use crate::error::Result;
use crate::network::LoadsCheckpoint;
use crate::policy::Policy;

/// Picks a uniformly random discrete action for every slot.
#[derive(Debug, Clone)]
pub struct RandomPolicy<O> {
    n_actions: usize,
    rng: StdRng,
    _obs: PhantomData<O>,
}

impl<O> RandomPolicy<O> {
    pub fn new(n_actions: usize, seed: u64) -> Self {
        Self {
            n_actions: n_actions.max(1),
            rng: StdRng::seed_from_u64(seed),
            _obs: PhantomData,
        }
    }
}

impl<O> Policy for RandomPolicy<O> {
    type Observation = O;
    type Action = usize;
    type Internal = ();

    fn new_internals(&self) {}

    fn act(&mut self, observations: &[O], internals: &[()]) -> Result<(Vec<usize>, Vec<()>)> {
        let actions = observations
            .iter()
            .map(|_| self.rng.gen_range(0..self.n_actions))
            .collect();
        Ok((actions, internals.to_vec()))
    }
}

/// Nothing to load; every checkpoint evaluates the same random play.
impl<O> LoadsCheckpoint for RandomPolicy<O> {
    fn load_checkpoint(&mut self, _path: &std::path::Path) -> Result<()> {
        Ok(())
    }
}
