use std::path::PathBuf;

use ferryman_physics::GeometryError;
use thiserror::Error;

/// Failure to turn a level description into playable collision
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid level file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("unknown skybox '{0}'")]
    UnknownSkybox(String),

    #[error("invalid terrain: {0}")]
    InvalidTerrain(String),

    #[error("spirit {spirit} refers to drop-off {drop_off}, but the level has {count}")]
    InvalidDropOff {
        spirit: usize,
        drop_off: usize,
        count: usize,
    },

    #[error("no built-in level {0}")]
    UnknownLevel(usize),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
