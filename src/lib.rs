pub mod cadence;
pub mod cli;
pub mod config;
pub mod env;
pub mod episode;
pub mod error;
pub mod eval;
pub mod network;
pub mod persistence;
pub mod policy;
pub mod report;
pub mod sim;
pub mod training;

pub use cadence::{CadenceScheduler, CheckpointCadence, SummaryCadence};
pub use config::AppConfig;
pub use env::{EnvironmentBatch, StepBatch, StepInfo};
pub use episode::{EvaluationAccumulator, RewardAccumulator, TrainingRewardTracker};
pub use error::{Result, TallyError};
pub use eval::{EvalContainer, EvalOutcome, EvaluationDriver};
pub use network::{LoadsCheckpoint, Network};
pub use persistence::{Saver, SummaryWriter};
pub use policy::Policy;
pub use report::{ProgressReporter, ReportContext};
pub use training::{Learner, TrainingLoop};
