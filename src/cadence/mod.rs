//! Cadence scheduling
//!
//! Two independent, self-resetting triggers: a step-count threshold for
//! checkpoints and a wall-clock period for summaries.

pub mod checkpoint;
pub mod scheduler;
pub mod summary;

pub use checkpoint::CheckpointCadence;
pub use scheduler::CadenceScheduler;
pub use summary::{parameter_path, write_summary_payload, SummaryCadence, TOTAL_LOSS_SUMMARY};
