//! Training
//!
//! Learner interface, the global step count source and the synchronous
//! training loop.

pub mod learner;
pub mod session;
pub mod steps;

pub use learner::{LearnStep, Learner, Rollout};
pub use session::{SessionLimits, TrainingLoop, TrainingSummary};
pub use steps::{GlobalStepSource, SingleProcess};
