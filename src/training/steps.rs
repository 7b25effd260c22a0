use crate::error::Result;

/// Source of the global step count.
///
/// In a distributed run the count is aggregated across processes by
/// whatever transport the run uses; this crate only consumes it.
pub trait GlobalStepSource {
    fn global_step_count(&mut self, local_step_count: u64) -> Result<u64>;
}

/// Single-process run: the global count is the local count.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl GlobalStepSource for SingleProcess {
    fn global_step_count(&mut self, local_step_count: u64) -> Result<u64> {
        Ok(local_step_count)
    }
}
