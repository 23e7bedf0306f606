use std::path::PathBuf;

use ferryman_world::LevelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("level {number} does not exist (levels 0..{count} are available)")]
    InvalidLevelNumber { number: usize, count: usize },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid game config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Level(#[from] LevelError),
}
