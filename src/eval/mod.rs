//! Evaluation
//!
//! A single lockstep pass over a batch ([`EvaluationDriver`]) and the
//! container that scores every saved checkpoint of a run.

pub mod container;
pub mod driver;

pub use container::{BestEpoch, EvalContainer};
pub use driver::{EvalOutcome, EvaluationDriver};
