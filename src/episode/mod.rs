//! Episode lifecycle tracking
//!
//! Per-slot reward buffers for a fixed batch of environments, in two modes:
//! - continuous (training): every completed episode is emitted and its slot
//!   restarts from zero
//! - once per slot (evaluation): each slot contributes one final score and is
//!   frozen afterwards

pub mod accumulator;
pub mod buffer;
pub mod evaluation;
pub mod tracker;

pub use accumulator::{Completed, RewardAccumulator};
pub use buffer::{mean, std_dev, RewardBuffer};
pub use evaluation::EvaluationAccumulator;
pub use tracker::{TrainingRewardTracker, TRAIN_REWARD_SUMMARY};
