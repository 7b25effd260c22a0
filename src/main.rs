use clap::Parser;
use tally::cli::{self, Cli, Commands, TrainOverrides};
use tally::config::AppConfig;
use tally::error::Result;
use tracing::info;

mod main_runtime;

use main_runtime::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config)?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Train {
            task,
            steps,
            nb_env,
            epoch_len,
            summary_secs,
            rank,
            log_dir,
            resume,
            seed,
        } => {
            TrainOverrides {
                steps,
                nb_env,
                epoch_len,
                summary_secs,
                rank,
                log_dir,
                seed,
            }
            .apply(&mut config);

            let summary = cli::run_train(task, config, resume)?;
            info!(
                final_step_count = summary.final_step_count,
                episodes = summary.episodes,
                checkpoints = summary.checkpoints,
                last_mean_reward = ?summary.last_mean_reward,
                "Done"
            );
        }
        Commands::Eval {
            log_dir,
            nb_episode,
            seed,
        } => {
            if let Some(best) = cli::run_eval(&log_dir, nb_episode, seed)? {
                info!(epoch_id = best.epoch_id, mean = best.mean, "Best epoch");
            }
        }
    }

    Ok(())
}
