//! Environment Interfaces
//!
//! The vectorised environment batch the control loops step in lockstep,
//! the per-step info that signals episode completion, and an in-process
//! adapter that turns N single environments into a batch.

mod batch;
mod info;
mod vec_env;

pub use batch::{EnvironmentBatch, StepBatch};
pub use info::{ends_episode, EpisodeResult, StepInfo};
pub use vec_env::{Environment, Step, VecEnv};
