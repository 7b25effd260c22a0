//! Classic cart-pole balancing task.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::{Environment, Step, StepInfo};
use crate::error::{Result, TallyError};

// Physics constants (standard cart-pole)
const GRAVITY: f64 = 9.8;
const MASSCART: f64 = 1.0;
const MASSPOLE: f64 = 0.1;
const TOTAL_MASS: f64 = MASSCART + MASSPOLE;
const LENGTH: f64 = 0.5; // half the pole's length
const POLEMASS_LENGTH: f64 = MASSPOLE * LENGTH;
const FORCE_MAG: f64 = 10.0;
const TAU: f64 = 0.02; // seconds between state updates

const X_THRESHOLD: f64 = 2.4;
const THETA_THRESHOLD: f64 = 0.209; // ~12 degrees

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CartPoleState {
    pub x: f64,
    pub x_dot: f64,
    pub theta: f64,
    pub theta_dot: f64,
}

impl CartPoleState {
    fn observation(&self) -> Vec<f64> {
        vec![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

/// Reward 1 per surviving step. An episode ends when the pole falls, the
/// cart leaves the track or `max_steps` is reached; the final step carries
/// the episode length in its info.
#[derive(Debug, Clone)]
pub struct CartPole {
    state: CartPoleState,
    max_steps: usize,
    current_step: usize,
    rng: StdRng,
}

impl CartPole {
    pub fn new(max_steps: usize, seed: u64) -> Self {
        Self {
            state: CartPoleState::default(),
            max_steps,
            current_step: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> CartPoleState {
        self.state
    }
}

impl Environment for CartPole {
    type Observation = Vec<f64>;
    type Action = usize;

    fn reset(&mut self) -> Result<Vec<f64>> {
        let rng = &mut self.rng;
        let mut jitter = || rng.gen_range(-0.05..0.05);
        let state = CartPoleState {
            x: jitter(),
            x_dot: jitter(),
            theta: jitter(),
            theta_dot: jitter(),
        };
        self.state = state;
        self.current_step = 0;
        Ok(self.state.observation())
    }

    fn step(&mut self, action: usize) -> Result<Step<Vec<f64>>> {
        let force = match action {
            0 => -FORCE_MAG,
            1 => FORCE_MAG,
            other => {
                return Err(TallyError::Environment(format!(
                    "cart-pole action must be 0 or 1, got {other}"
                )))
            }
        };
        self.current_step += 1;

        let s = &mut self.state;
        let cos_theta = s.theta.cos();
        let sin_theta = s.theta.sin();

        let temp = (force + POLEMASS_LENGTH * s.theta_dot.powi(2) * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (LENGTH * (4.0 / 3.0 - MASSPOLE * cos_theta.powi(2) / TOTAL_MASS));
        let x_acc = temp - POLEMASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // Euler integration
        s.x += TAU * s.x_dot;
        s.x_dot += TAU * x_acc;
        s.theta += TAU * s.theta_dot;
        s.theta_dot += TAU * theta_acc;

        let fell = s.x.abs() > X_THRESHOLD || s.theta.abs() > THETA_THRESHOLD;
        let truncated = self.current_step >= self.max_steps;
        let terminal = fell || truncated;

        let info = if terminal {
            StepInfo::with("episode_steps", self.current_step).insert("truncated", !fell)
        } else {
            StepInfo::empty()
        };

        Ok(Step {
            obs: self.state.observation(),
            reward: 1.0,
            terminal,
            info,
        })
    }
}
