//! Simulation kit
//!
//! Small in-process environments, policies and a learner for running the
//! harness end to end without external collaborators.

pub mod cartpole;
pub mod countdown;
pub mod linear;
pub mod random_policy;

pub use cartpole::{CartPole, CartPoleState};
pub use countdown::Countdown;
pub use linear::{LinearController, LinearParams, RandomSearch};
pub use random_policy::RandomPolicy;

/// Observation width of the cart-pole task
pub const CARTPOLE_OBS_DIM: usize = 4;
