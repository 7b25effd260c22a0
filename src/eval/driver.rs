//! Lockstep evaluation pass.

use tracing::debug;

use crate::env::EnvironmentBatch;
use crate::episode::{mean, std_dev, EvaluationAccumulator};
use crate::error::{ensure_batch_len, Result, TallyError};
use crate::policy::Policy;

/// Result of one evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutcome {
    pub mean: f64,
    /// Population standard deviation of the per-slot scores
    pub std_dev: f64,
    /// Final score of each slot
    pub rewards: Vec<f64>,
    /// Lockstep iterations until every slot completed
    pub steps: usize,
}

/// Runs every slot of a batch until each has completed exactly one
/// episode.
///
/// The driver is consumed by [`run`](Self::run); evaluate another checkpoint
/// with a new driver. There is no step limit: a slot that never completes
/// keeps the pass running.
pub struct EvaluationDriver<'a, E, P> {
    env: &'a mut E,
    policy: &'a mut P,
}

impl<'a, E, P> EvaluationDriver<'a, E, P>
where
    E: EnvironmentBatch,
    P: Policy<Observation = E::Observation, Action = E::Action>,
{
    pub fn new(env: &'a mut E, policy: &'a mut P) -> Self {
        Self { env, policy }
    }

    pub fn run(self) -> Result<EvalOutcome> {
        let nb_env = self.env.nb_env();
        if nb_env == 0 {
            return Err(TallyError::Environment(
                "evaluation needs at least one environment".to_string(),
            ));
        }

        let mut observations = self.env.reset()?;
        ensure_batch_len("observations", nb_env, observations.len())?;
        let mut internals = self.policy.batch_internals(nb_env);
        let mut accumulator = EvaluationAccumulator::new(nb_env);
        let mut steps = 0usize;

        while !accumulator.is_complete() {
            let (actions, next_internals) = self.policy.act(&observations, &internals)?;
            ensure_batch_len("actions", nb_env, actions.len())?;
            ensure_batch_len("internals", nb_env, next_internals.len())?;

            let batch = self.env.step(&actions)?;
            batch.validate(nb_env)?;
            steps += 1;

            internals = next_internals;
            self.policy.reset_internals(&mut internals, &batch.terminals);

            let newly = accumulator.ingest(&batch.rewards, &batch.terminals, &batch.infos)?;
            if !newly.is_empty() {
                debug!(
                    step = steps,
                    completed = accumulator.completed_count(),
                    nb_env,
                    "Evaluation slots completed"
                );
            }
            observations = batch.observations;
        }

        let rewards = accumulator.buffer().values().to_vec();
        Ok(EvalOutcome {
            mean: mean(&rewards).unwrap_or_default(),
            std_dev: std_dev(&rewards).unwrap_or_default(),
            rewards,
            steps,
        })
    }
}
