//! Persistence Layer
//!
//! Checkpoint saving, summary sinks, the run directory layout and the
//! evaluation results file.

pub mod eval_log;
pub mod log_dir;
pub mod saver;
pub mod summary_writer;

pub use eval_log::{EvalLog, EvalRecord};
pub use log_dir::LogDir;
pub use saver::{FileSaver, Saver};
pub use summary_writer::{
    read_summaries, Image, JsonlSummaryWriter, Metric, SummaryRecord, SummaryWriter,
};

#[cfg(test)]
pub use summary_writer::MockSummaryWriter;
