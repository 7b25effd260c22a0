use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::env::VecEnv;
use crate::error::{Result, TallyError};
use crate::eval::{BestEpoch, EvalContainer};
use crate::network::LoadsCheckpoint;
use crate::persistence::{FileSaver, JsonlSummaryWriter, LogDir};
use crate::sim::{CartPole, Countdown, LinearController, RandomSearch, CARTPOLE_OBS_DIM};
use crate::training::{TrainingLoop, TrainingSummary};

/// Episode cap for cart-pole
const CARTPOLE_MAX_STEPS: usize = 500;
/// Countdown shape: lives and steps per life
const COUNTDOWN_LIVES: u32 = 3;
const COUNTDOWN_LIFE_LEN: u32 = 20;
/// Perturbation size of the random-search learner
const SEARCH_NOISE: f64 = 0.1;

#[derive(Parser)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "Episode reward tracking and checkpoint cadence for RL runs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <TALLY_ENV>.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a linear controller on a simulated task
    Train {
        /// Task to train on
        #[arg(long, value_enum, default_value_t = SimTask::CartPole)]
        task: SimTask,
        /// Stop once this many environment steps were taken
        #[arg(long)]
        steps: Option<u64>,
        /// Number of environments stepped in lockstep
        #[arg(long)]
        nb_env: Option<usize>,
        /// Environment steps between checkpoints
        #[arg(long)]
        epoch_len: Option<u64>,
        /// Minimum seconds between summaries
        #[arg(long)]
        summary_secs: Option<f64>,
        /// Rank of this process in a distributed run
        #[arg(long, env = "TALLY_RANK")]
        rank: Option<usize>,
        /// Run directory for checkpoints and summaries
        #[arg(long)]
        log_dir: Option<PathBuf>,
        /// Continue from the latest checkpoint in the run directory
        #[arg(long)]
        resume: bool,
        /// Base seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Evaluate every checkpoint of a training run
    Eval {
        /// Run directory written by `train`
        #[arg(long)]
        log_dir: PathBuf,
        /// Episodes per checkpoint (one per environment)
        #[arg(long, default_value = "30")]
        nb_episode: usize,
        /// Seed for the evaluation environments
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

/// Built-in simulated tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimTask {
    CartPole,
    Countdown,
}

impl SimTask {
    pub fn obs_dim(self) -> usize {
        match self {
            SimTask::CartPole => CARTPOLE_OBS_DIM,
            SimTask::Countdown => 2,
        }
    }
}

impl fmt::Display for SimTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimTask::CartPole => write!(f, "cart-pole"),
            SimTask::Countdown => write!(f, "countdown"),
        }
    }
}

/// Settings persisted next to the checkpoints so `eval` can rebuild the task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArgs {
    pub task: SimTask,
    pub config: AppConfig,
}

impl RunArgs {
    pub fn save(&self, log_dir: &LogDir) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(anyhow::Error::from)?;
        std::fs::write(log_dir.args_path(), text)?;
        Ok(())
    }

    pub fn load(log_dir: &LogDir) -> Result<Self> {
        let text = std::fs::read_to_string(log_dir.args_path())?;
        Ok(toml::from_str(&text).map_err(anyhow::Error::from)?)
    }
}

/// Command-line overrides for `train`
#[derive(Debug, Clone, Default)]
pub struct TrainOverrides {
    pub steps: Option<u64>,
    pub nb_env: Option<usize>,
    pub epoch_len: Option<u64>,
    pub summary_secs: Option<f64>,
    pub rank: Option<usize>,
    pub log_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl TrainOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(steps) = self.steps {
            config.session.max_steps = steps;
        }
        if let Some(nb_env) = self.nb_env {
            config.session.nb_env = nb_env;
        }
        if let Some(epoch_len) = self.epoch_len {
            config.cadence.epoch_len = epoch_len;
        }
        if let Some(secs) = self.summary_secs {
            config.cadence.summary_frequency_secs = secs;
        }
        if self.rank.is_some() {
            config.distributed.rank = self.rank;
        }
        if let Some(dir) = &self.log_dir {
            config.session.log_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.session.seed = seed;
        }
    }
}

fn cartpole_batch(nb_env: usize, seed: u64) -> VecEnv<CartPole> {
    VecEnv::from_fn(nb_env, |i| {
        CartPole::new(CARTPOLE_MAX_STEPS, seed.wrapping_add(i as u64))
    })
}

fn countdown_batch(nb_env: usize) -> VecEnv<Countdown> {
    VecEnv::from_fn(nb_env, |_| Countdown::new(COUNTDOWN_LIVES, COUNTDOWN_LIFE_LEN))
}

/// Find the checkpoint to resume from and load it into `policy`.
///
/// Returns the step count of that checkpoint, or 0 when the run directory
/// holds none.
pub fn resume_from_latest(log_dir: &LogDir, policy: &mut LinearController) -> Result<u64> {
    let Some(epoch) = log_dir.latest_epoch()? else {
        warn!("No checkpoint in {:?}, starting fresh", log_dir.root());
        return Ok(0);
    };
    policy.load_checkpoint(&log_dir.model_path(epoch))?;
    info!(epoch, "Resuming from checkpoint");
    Ok(epoch)
}

/// Train a linear controller on `task` with the given configuration.
pub fn run_train(task: SimTask, mut config: AppConfig, resume: bool) -> Result<TrainingSummary> {
    if let Err(errors) = config.validate() {
        return Err(TallyError::Other(anyhow::anyhow!(
            "invalid configuration: {}",
            errors.join("; ")
        )));
    }

    let log_dir = LogDir::create(&config.session.log_dir)?;
    let mut policy = LinearController::new(task.obs_dim());
    if resume {
        config.session.initial_step_count = resume_from_latest(&log_dir, &mut policy)?;
    }

    RunArgs {
        task,
        config: config.clone(),
    }
    .save(&log_dir)?;

    let saver = Box::new(FileSaver::new(log_dir.clone()));
    let writer = Box::new(JsonlSummaryWriter::open(log_dir.summary_path())?);
    let learner = RandomSearch::new(SEARCH_NOISE, config.session.seed);
    let nb_env = config.session.nb_env;
    let seed = config.session.seed;

    info!(%task, nb_env, log_dir = ?log_dir.root(), "Training");
    match task {
        SimTask::CartPole => TrainingLoop::new(
            cartpole_batch(nb_env, seed),
            policy,
            learner,
            saver,
            writer,
            &config,
        )?
        .run(),
        SimTask::Countdown => {
            TrainingLoop::new(countdown_batch(nb_env), policy, learner, saver, writer, &config)?
                .run()
        }
    }
}

/// Score every checkpoint under `log_dir` with `nb_episode` environments.
pub fn run_eval(log_dir: &Path, nb_episode: usize, seed: u64) -> Result<Option<BestEpoch>> {
    let log_dir = LogDir::new(log_dir);
    let args = RunArgs::load(&log_dir)?;
    let policy = LinearController::new(args.task.obs_dim());

    info!(task = %args.task, nb_episode, "Evaluating {:?}", log_dir.root());
    match args.task {
        SimTask::CartPole => {
            EvalContainer::new(log_dir, cartpole_batch(nb_episode, seed), policy).run()
        }
        SimTask::Countdown => {
            EvalContainer::new(log_dir, countdown_batch(nb_episode), policy).run()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_train() {
        let cli = Cli::try_parse_from([
            "tally",
            "train",
            "--task",
            "countdown",
            "--steps",
            "1000",
            "--epoch-len",
            "100",
            "--resume",
        ])
        .unwrap();

        match cli.command {
            Commands::Train {
                task,
                steps,
                epoch_len,
                resume,
                ..
            } => {
                assert_eq!(task, SimTask::Countdown);
                assert_eq!(steps, Some(1000));
                assert_eq!(epoch_len, Some(100));
                assert!(resume);
            }
            _ => panic!("expected train"),
        }
        assert_eq!(cli.config, PathBuf::from("config"));
    }

    #[test]
    fn test_cli_parses_eval() {
        let cli = Cli::try_parse_from(["tally", "eval", "--log-dir", "runs/a", "--nb-episode", "4"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Eval { nb_episode: 4, seed: 0, .. }
        ));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = AppConfig::default();
        TrainOverrides {
            steps: Some(5),
            rank: Some(2),
            summary_secs: Some(0.5),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.session.max_steps, 5);
        assert_eq!(config.distributed.rank, Some(2));
        assert_eq!(config.cadence.summary_frequency_secs, 0.5);
        assert_eq!(config.cadence.epoch_len, 10_000);
    }

    #[test]
    fn test_run_args_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = LogDir::create(tmp.path()).unwrap();
        let mut config = AppConfig::default();
        config.session.nb_env = 3;
        config.distributed.rank = Some(1);

        RunArgs {
            task: SimTask::Countdown,
            config,
        }
        .save(&log_dir)
        .unwrap();

        let loaded = RunArgs::load(&log_dir).unwrap();
        assert_eq!(loaded.task, SimTask::Countdown);
        assert_eq!(loaded.config.session.nb_env, 3);
        assert_eq!(loaded.config.distributed.rank, Some(1));
        assert_eq!(loaded.config.logging.dir, None);
    }
}
