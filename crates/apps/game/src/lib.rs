//! Headless game loop for driving spirits to their drop-offs

pub mod config;
mod error;
mod hud;
mod input;
mod state;

pub use config::GameConfig;
pub use error::GameError;
pub use hud::Hud;
pub use input::DriveInput;
pub use state::{GameEvent, GameState, LevelOutcome, Spirit};

use ferryman_world::{Level, LevelConfig, Registry};

/// Load bundled level `number` against `registry`
pub fn load_builtin_level(number: usize, registry: &Registry) -> Result<Level, GameError> {
    let count = LevelConfig::builtin_count();
    if number >= count {
        return Err(GameError::InvalidLevelNumber { number, count });
    }
    let config = LevelConfig::builtin(number)?;
    Ok(Level::load(&config, registry)?)
}
