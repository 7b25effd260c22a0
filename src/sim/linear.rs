//! Linear threshold controller and a random-search learner for it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TallyError};
use crate::network::{LoadsCheckpoint, NamedParameter, Network};
use crate::persistence::Metric;
use crate::policy::Policy;
use crate::training::{LearnStep, Learner, Rollout};

/// Saved form of the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weight: Vec<f64>,
    pub bias: f64,
}

impl LinearParams {
    pub fn zeros(obs_dim: usize) -> Self {
        Self {
            weight: vec![0.0; obs_dim],
            bias: 0.0,
        }
    }
}

/// Chooses action 1 when `weight · obs + bias > 0`, else action 0.
#[derive(Debug, Clone)]
pub struct LinearController {
    params: LinearParams,
    /// Last update applied by the learner, reported as the gradient
    last_delta: Option<LinearParams>,
}

impl LinearController {
    pub fn new(obs_dim: usize) -> Self {
        Self::from_params(LinearParams::zeros(obs_dim))
    }

    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            last_delta: None,
        }
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    pub fn obs_dim(&self) -> usize {
        self.params.weight.len()
    }

    fn decide(&self, obs: &[f64]) -> Result<usize> {
        if obs.len() != self.obs_dim() {
            return Err(TallyError::Policy(format!(
                "observation has {} features, controller expects {}",
                obs.len(),
                self.obs_dim()
            )));
        }
        let score: f64 = self
            .params
            .weight
            .iter()
            .zip(obs)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.params.bias;
        Ok(usize::from(score > 0.0))
    }
}

impl Policy for LinearController {
    type Observation = Vec<f64>;
    type Action = usize;
    type Internal = ();

    fn new_internals(&self) {}

    fn act(
        &mut self,
        observations: &[Vec<f64>],
        internals: &[()],
    ) -> Result<(Vec<usize>, Vec<()>)> {
        let actions = observations
            .iter()
            .map(|obs| self.decide(obs))
            .collect::<Result<Vec<_>>>()?;
        Ok((actions, internals.to_vec()))
    }
}

fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

impl Network for LinearController {
    fn named_parameters(&self) -> Vec<NamedParameter> {
        let mut weight = NamedParameter::new("controller.weight", to_f32(&self.params.weight));
        let mut bias = NamedParameter::new("controller.bias", vec![self.params.bias as f32]);
        if let Some(delta) = &self.last_delta {
            weight = weight.with_grad(to_f32(&delta.weight));
            bias = bias.with_grad(vec![delta.bias as f32]);
        }
        vec![weight, bias]
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.params)?)
    }
}

impl LoadsCheckpoint for LinearController {
    fn load_checkpoint(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let params: LinearParams = serde_json::from_slice(&bytes)?;
        if params.weight.len() != self.obs_dim() {
            return Err(TallyError::Checkpoint(format!(
                "{:?} has {} weights, controller expects {}",
                path,
                params.weight.len(),
                self.obs_dim()
            )));
        }
        self.params = params;
        self.last_delta = None;
        Ok(())
    }
}

/// Hill-climbing random search.
///
/// Each update scores the rollout just played by its mean step reward. A
/// score at least as good as the best so far keeps the current parameters;
/// a worse one rolls back to the best. Then a uniform perturbation of size
/// `noise_scale` is applied for the next rollout.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    noise_scale: f64,
    best: Option<(LinearParams, f64)>,
    updates: u64,
    rng: StdRng,
}

#[derive(Debug, Serialize)]
struct RandomSearchState<'a> {
    noise_scale: f64,
    updates: u64,
    best_params: Option<&'a LinearParams>,
    best_score: Option<f64>,
}

impl RandomSearch {
    pub fn new(noise_scale: f64, seed: u64) -> Self {
        Self {
            noise_scale,
            best: None,
            updates: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, score)| *score)
    }

    fn perturbation(&mut self, dim: usize) -> LinearParams {
        let scale = self.noise_scale;
        let mut sample = || {
            if scale > 0.0 {
                self.rng.gen_range(-scale..=scale)
            } else {
                0.0
            }
        };
        LinearParams {
            weight: (0..dim).map(|_| sample()).collect(),
            bias: sample(),
        }
    }
}

impl Learner<LinearController> for RandomSearch {
    fn learn(
        &mut self,
        policy: &mut LinearController,
        rollout: &Rollout<Vec<f64>, usize>,
    ) -> Result<LearnStep> {
        let score = rollout.mean_step_reward();
        self.updates += 1;

        let improved = self.best.as_ref().map_or(true, |(_, best)| score >= *best);
        if improved {
            self.best = Some((policy.params.clone(), score));
        } else if let Some((params, _)) = &self.best {
            policy.params = params.clone();
        }

        let delta = self.perturbation(policy.obs_dim());
        for (w, d) in policy.params.weight.iter_mut().zip(&delta.weight) {
            *w += d;
        }
        policy.params.bias += delta.bias;
        policy.last_delta = Some(delta);

        let best_score = self.best_score().unwrap_or(score);
        debug!(score, best_score, improved, "Random search update");

        Ok(LearnStep::new(-score)
            .with_loss("policy", -score)
            .with_metric("best_score", Metric::Scalar(best_score))
            .with_metric("improved", Metric::Scalar(if improved { 1.0 } else { 0.0 })))
    }

    fn optimizer_state(&self) -> Option<serde_json::Value> {
        let state = RandomSearchState {
            noise_scale: self.noise_scale,
            updates: self.updates,
            best_params: self.best.as_ref().map(|(p, _)| p),
            best_score: self.best_score(),
        };
        serde_json::to_value(state).ok()
    }
}
