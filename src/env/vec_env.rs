use super::batch::{EnvironmentBatch, StepBatch};
use super::info::StepInfo;
use crate::error::{ensure_batch_len, Result};

/// Outcome of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O> {
    pub obs: O,
    pub reward: f64,
    pub terminal: bool,
    pub info: StepInfo,
}

/// A single environment instance
pub trait Environment {
    type Observation: Clone;
    type Action: Clone;

    /// Start a new episode from scratch
    fn reset(&mut self) -> Result<Self::Observation>;
    fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>>;

    /// Continue after a step reported `terminal`.
    ///
    /// Environments whose terminal flag can end only part of an episode
    /// (a lost life) override this to keep the rest of the episode going.
    fn restart_after_terminal(&mut self) -> Result<Self::Observation> {
        self.reset()
    }
}

/// Runs N environments sequentially in-process behind the batch interface.
///
/// A slot that reports `terminal` is restarted immediately through
/// [`Environment::restart_after_terminal`] and its returned observation is
/// the first one after the restart.
pub struct VecEnv<E: Environment> {
    envs: Vec<E>,
}

impl<E: Environment> VecEnv<E> {
    pub fn new(envs: Vec<E>) -> Self {
        Self { envs }
    }

    /// Build `nb_env` environments from a factory taking the slot index.
    pub fn from_fn(nb_env: usize, make: impl FnMut(usize) -> E) -> Self {
        Self::new((0..nb_env).map(make).collect())
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }
}

impl<E: Environment> EnvironmentBatch for VecEnv<E> {
    type Observation = E::Observation;
    type Action = E::Action;

    fn nb_env(&self) -> usize {
        self.envs.len()
    }

    fn reset(&mut self) -> Result<Vec<Self::Observation>> {
        self.envs.iter_mut().map(|env| env.reset()).collect()
    }

    fn step(&mut self, actions: &[Self::Action]) -> Result<StepBatch<Self::Observation>> {
        ensure_batch_len("actions", self.envs.len(), actions.len())?;

        let n = self.envs.len();
        let mut batch = StepBatch::new(
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
        );

        for (env, action) in self.envs.iter_mut().zip(actions) {
            let step = env.step(action.clone())?;
            let obs = if step.terminal {
                env.restart_after_terminal()?
            } else {
                step.obs
            };
            batch.observations.push(obs);
            batch.rewards.push(step.reward);
            batch.terminals.push(step.terminal);
            batch.infos.push(step.info);
        }

        Ok(batch)
    }
}
