use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ferryman_game::{load_builtin_level, DriveInput, GameConfig, GameState};
use ferryman_world::{Level, LevelConfig, Registry};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ferryman")]
#[command(about = "Drive a level headlessly and report the outcome", long_about = None)]
struct Args {
    /// Level file to load instead of a bundled level
    #[arg(long)]
    level: Option<PathBuf>,

    /// Bundled level to load
    #[arg(long, default_value = "0")]
    level_number: usize,

    /// Material and skybox registry (defaults to the bundled one)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Gameplay tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value = "3600")]
    ticks: u32,

    /// Throttle held for the whole run (-1 to 1)
    #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
    throttle: f32,

    /// Steering held for the whole run (-1 to 1)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    steer: f32,

    /// Frame time in seconds
    #[arg(long, default_value = "0.016666668")]
    dt: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let registry = match &args.registry {
        Some(path) => Registry::from_path(path)
            .with_context(|| format!("Failed to load registry {}", path.display()))?,
        None => Registry::builtin().context("Bundled registry is invalid")?,
    };
    let config = match &args.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("Failed to load game config {}", path.display()))?,
        None => GameConfig::default(),
    };

    let level = match &args.level {
        Some(path) => {
            let level_config = LevelConfig::from_path(path)
                .with_context(|| format!("Failed to read level {}", path.display()))?;
            Level::load(&level_config, &registry)
                .with_context(|| format!("Failed to build level {}", path.display()))?
        }
        None => load_builtin_level(args.level_number, &registry)
            .with_context(|| format!("Failed to load level {}", args.level_number))?,
    };

    let mut game = GameState::new(config);
    game.enter_level(level, args.level_number);

    let input = DriveInput::new(args.throttle, args.steer);
    for tick in 0..args.ticks {
        if let Some(outcome) = game.update(args.dt, &input) {
            tracing::info!(
                "Round finished after {} ticks: {} spirits, score {}",
                tick + 1,
                outcome.spirits_transported,
                outcome.score
            );
            return Ok(());
        }

        if tick % 60 == 0 {
            let chassis = game.chassis();
            let report = game.last_report();
            tracing::debug!(
                "tick {}: position ({:.1}, {:.1}, {:.1}) speed {:.2} grounded {} submerged {} walls {}",
                tick,
                chassis.position.x,
                chassis.position.y,
                chassis.position.z,
                chassis.speed(),
                report.grounded,
                report.submerged,
                report.wall_contacts
            );
        }
    }

    let chassis = game.chassis();
    tracing::info!(
        "Stopped after {} ticks at ({:.1}, {:.1}, {:.1}): {} spirits transported, score {}, {:.1}s left",
        args.ticks,
        chassis.position.x,
        chassis.position.y,
        chassis.position.z,
        game.spirits_transported(),
        game.hud().score,
        game.hud().time_remaining
    );
    Ok(())
}
