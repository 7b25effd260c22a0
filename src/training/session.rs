//! Synchronous training loop.

use tracing::{debug, info};

use super::learner::{Learner, Rollout};
use super::steps::{GlobalStepSource, SingleProcess};
use crate::cadence::CadenceScheduler;
use crate::config::AppConfig;
use crate::env::EnvironmentBatch;
use crate::episode::TrainingRewardTracker;
use crate::error::{ensure_batch_len, Result};
use crate::network::Network;
use crate::persistence::{Saver, SummaryWriter};
use crate::policy::Policy;
use crate::report::ReportContext;

/// Session limits taken from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_steps: u64,
    pub rollout_len: usize,
    pub initial_step_count: u64,
}

impl SessionLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_steps: config.session.max_steps,
            rollout_len: config.session.rollout_len.max(1),
            initial_step_count: config.session.initial_step_count,
        }
    }
}

/// What a finished session reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    pub final_step_count: u64,
    pub episodes: usize,
    pub checkpoints: usize,
    pub learner_updates: usize,
    /// Mean reward of the last step that completed an episode
    pub last_mean_reward: Option<f64>,
}

/// One training process: steps the batch, tracks rewards, updates the
/// policy after every rollout and fires checkpoints and summaries on
/// cadence.
pub struct TrainingLoop<E, P, L, G = SingleProcess>
where
    E: EnvironmentBatch,
    P: Policy<Observation = E::Observation, Action = E::Action> + Network,
    L: Learner<P>,
    G: GlobalStepSource,
{
    env: E,
    policy: P,
    learner: L,
    steps: G,
    saver: Box<dyn Saver>,
    writer: Box<dyn SummaryWriter>,
    tracker: TrainingRewardTracker,
    scheduler: CadenceScheduler,
    limits: SessionLimits,
}

impl<E, P, L> TrainingLoop<E, P, L, SingleProcess>
where
    E: EnvironmentBatch,
    P: Policy<Observation = E::Observation, Action = E::Action> + Network,
    L: Learner<P>,
{
    /// Wire a session from configuration. Fails with `DegenerateCadence`
    /// on an unusable cadence.
    pub fn new(
        env: E,
        policy: P,
        learner: L,
        saver: Box<dyn Saver>,
        writer: Box<dyn SummaryWriter>,
        config: &AppConfig,
    ) -> Result<Self> {
        let limits = SessionLimits::from_config(config);
        let context = ReportContext::from_rank(config.distributed.rank);
        let tracker =
            TrainingRewardTracker::resumed(env.nb_env(), context, limits.initial_step_count);
        let scheduler = CadenceScheduler::new(&config.cadence)?;

        Ok(Self {
            env,
            policy,
            learner,
            steps: SingleProcess,
            saver,
            writer,
            tracker,
            scheduler,
            limits,
        })
    }
}

impl<E, P, L, G> TrainingLoop<E, P, L, G>
where
    E: EnvironmentBatch,
    P: Policy<Observation = E::Observation, Action = E::Action> + Network,
    L: Learner<P>,
    G: GlobalStepSource,
{
    /// Replace the global step source (distributed runs)
    pub fn with_step_source<G2: GlobalStepSource>(self, steps: G2) -> TrainingLoop<E, P, L, G2> {
        TrainingLoop {
            env: self.env,
            policy: self.policy,
            learner: self.learner,
            steps,
            saver: self.saver,
            writer: self.writer,
            tracker: self.tracker,
            scheduler: self.scheduler,
            limits: self.limits,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    pub fn scheduler(&self) -> &CadenceScheduler {
        &self.scheduler
    }

    pub fn tracker(&self) -> &TrainingRewardTracker {
        &self.tracker
    }

    /// Train until the local step count reaches `max_steps`.
    pub fn run(&mut self) -> Result<TrainingSummary> {
        let nb_env = self.env.nb_env();
        let initial = self.limits.initial_step_count;

        self.scheduler.fast_forward(initial);
        info!(
            nb_env,
            initial_step_count = initial,
            max_steps = self.limits.max_steps,
            next_save_step = self.scheduler.next_save_step(),
            "Starting training session"
        );

        let mut summary = TrainingSummary {
            final_step_count: initial,
            ..Default::default()
        };

        let mut observations = self.env.reset()?;
        ensure_batch_len("observations", nb_env, observations.len())?;
        let mut internals = self.policy.batch_internals(nb_env);
        self.tracker.start();

        while self.tracker.local_step_count() < self.limits.max_steps {
            let mut rollout = Rollout::with_capacity(self.limits.rollout_len);
            let mut global_step_count = self.tracker.local_step_count();

            for _ in 0..self.limits.rollout_len {
                let (actions, next_internals) = self.policy.act(&observations, &internals)?;
                ensure_batch_len("actions", nb_env, actions.len())?;
                ensure_batch_len("internals", nb_env, next_internals.len())?;

                let batch = self.env.step(&actions)?;
                batch.validate(nb_env)?;

                internals = next_internals;
                self.policy.reset_internals(&mut internals, &batch.terminals);

                let completed = self
                    .tracker
                    .ingest(&batch.rewards, &batch.terminals, &batch.infos)?;
                global_step_count = self
                    .steps
                    .global_step_count(self.tracker.local_step_count())?;

                if !completed.is_empty() {
                    summary.episodes += completed.len();
                    summary.last_mean_reward = self
                        .tracker
                        .log_episode_results(&completed.rewards, global_step_count);
                    self.tracker.write_reward_summaries(
                        &completed.rewards,
                        global_step_count,
                        self.writer.as_mut(),
                    )?;
                }

                let previous = std::mem::replace(&mut observations, batch.observations);
                rollout.push(previous, actions, batch.rewards, batch.terminals);

                let learner = &self.learner;
                if self.scheduler.save_if_epoch(
                    global_step_count,
                    &self.policy,
                    || learner.optimizer_state(),
                    self.saver.as_mut(),
                )? {
                    summary.checkpoints += 1;
                }

                if self.tracker.local_step_count() >= self.limits.max_steps {
                    break;
                }
            }

            let learn_step = self.learner.learn(&mut self.policy, &rollout)?;
            summary.learner_updates += 1;
            debug!(
                total_loss = learn_step.total_loss,
                rollout_len = rollout.len(),
                "Learner update"
            );

            self.scheduler.write_summaries(
                &learn_step,
                &self.policy,
                global_step_count,
                self.writer.as_mut(),
            )?;
        }

        self.writer.flush()?;
        summary.final_step_count = self.tracker.local_step_count();
        info!(
            final_step_count = summary.final_step_count,
            episodes = summary.episodes,
            checkpoints = summary.checkpoints,
            "Training session finished"
        );
        Ok(summary)
    }
}
