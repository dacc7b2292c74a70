use std::error::Error;

use dotenv::dotenv;
use rand::Rng;
use robolearn::config::Config;
use robolearn::infra::{CompositeObserver, DefaultObserver, ReplayFile};
use robolearn::planners::PathPlanner;
use robolearn::program::Program;
use robolearn::state::{Level, LevelError};
use robolearn::{Game, GameSummary};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("robolearn=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_level(config: &Config) -> Result<Level, LevelError> {
    match &config.level_file {
        Some(path) => {
            info!("Loading level from {}", path.display());
            Level::load(path)
        }
        None => {
            let seed = config.seed.unwrap_or_else(|| rand::rng().random());
            info!("Generating {0}x{0} level with seed {1}", config.grid_size, seed);
            Level::generate(config.grid_size, seed)
        }
    }
}

fn report(summary: &GameSummary) {
    info!(
        "{} with {}/{} coins in {} moves ({:.1}s)",
        if summary.won { "Won" } else { "Lost" },
        summary.collected_coins,
        summary.total_coins,
        summary.moves,
        summary.elapsed.as_secs_f64()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    init_logging()?;

    let config = Config::from_env()?;
    let level = load_level(&config)?;

    let mut observer = CompositeObserver::new();
    observer.add(DefaultObserver);
    if let Some(replays_folder) = &config.replays_folder {
        let replay = ReplayFile::new(replays_folder, &config.user_name, &level)?;
        info!("Writing replay to {}", replay.path().display());
        observer.add(replay);
    }

    let mut game = Game::new(level, observer, config.delay).with_step_limit(config.step_limit);

    let summary = match &config.program_file {
        Some(path) => {
            let program = Program::load(path)?;
            game.run_program(&program).await?
        }
        None => {
            let planner = PathPlanner::new(config.planner.clone());
            match game.plan_and_run(&planner).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Level cannot be solved: {}", e);
                    return Err(e.into());
                }
            }
        }
    };

    report(&summary);
    Ok(())
}
