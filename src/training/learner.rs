//! Learner interface and the rollout it consumes.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::persistence::Metric;
use crate::policy::Policy;

/// One rollout of `len()` lockstep iterations over the whole batch.
///
/// Index `[t][i]` is iteration `t`, slot `i`. `observations[t]` is what the
/// policy saw when it chose `actions[t]`.
#[derive(Debug, Clone)]
pub struct Rollout<O, A> {
    pub observations: Vec<Vec<O>>,
    pub actions: Vec<Vec<A>>,
    pub rewards: Vec<Vec<f64>>,
    pub terminals: Vec<Vec<bool>>,
}

impl<O, A> Default for Rollout<O, A> {
    fn default() -> Self {
        Self {
            observations: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            terminals: Vec::new(),
        }
    }
}

impl<O, A> Rollout<O, A> {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            observations: Vec::with_capacity(len),
            actions: Vec::with_capacity(len),
            rewards: Vec::with_capacity(len),
            terminals: Vec::with_capacity(len),
        }
    }

    pub fn push(
        &mut self,
        observations: Vec<O>,
        actions: Vec<A>,
        rewards: Vec<f64>,
        terminals: Vec<bool>,
    ) {
        self.observations.push(observations);
        self.actions.push(actions);
        self.rewards.push(rewards);
        self.terminals.push(terminals);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Sum of every reward in the rollout
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().flatten().sum()
    }

    /// Mean reward per environment step, 0 for an empty rollout
    pub fn mean_step_reward(&self) -> f64 {
        let n: usize = self.rewards.iter().map(Vec::len).sum();
        if n == 0 {
            return 0.0;
        }
        self.total_reward() / n as f64
    }
}

/// What one learner update reports for summaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearnStep {
    pub total_loss: f64,
    pub losses: BTreeMap<String, f64>,
    pub metrics: BTreeMap<String, Metric>,
}

impl LearnStep {
    pub fn new(total_loss: f64) -> Self {
        Self {
            total_loss,
            ..Default::default()
        }
    }

    pub fn with_loss(mut self, name: impl Into<String>, value: f64) -> Self {
        self.losses.insert(name.into(), value);
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, metric: Metric) -> Self {
        self.metrics.insert(name.into(), metric);
        self
    }
}

/// Updates a policy from a rollout. How the update is computed is up to the
/// implementation.
pub trait Learner<P: Policy> {
    fn learn(
        &mut self,
        policy: &mut P,
        rollout: &Rollout<P::Observation, P::Action>,
    ) -> Result<LearnStep>;

    /// Serialisable optimizer state saved next to each checkpoint
    fn optimizer_state(&self) -> Option<serde_json::Value> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollout_rewards() {
        let mut rollout: Rollout<(), u8> = Rollout::with_capacity(2);
        assert_eq!(rollout.mean_step_reward(), 0.0);

        rollout.push(vec![(), ()], vec![0, 1], vec![1.0, 2.0], vec![false, false]);
        rollout.push(vec![(), ()], vec![1, 1], vec![3.0, 0.0], vec![true, false]);

        assert_eq!(rollout.len(), 2);
        assert_eq!(rollout.total_reward(), 6.0);
        assert_eq!(rollout.mean_step_reward(), 1.5);
    }

    #[test]
    fn test_learn_step_builder() {
        let step = LearnStep::new(2.0)
            .with_loss("value", 1.5)
            .with_metric("entropy", Metric::Scalar(0.1));
        assert_eq!(step.losses["value"], 1.5);
        assert_eq!(step.metrics["entropy"], Metric::Scalar(0.1));
    }
}
