//! Gameplay tuning, optionally loaded from TOML

use std::path::Path;

use ferryman_physics::ControllerConfig;
use serde::Deserialize;

use crate::error::GameError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds on the clock when a level starts
    pub round_seconds: f32,
    /// Pick-up reach on each of X and Z
    pub pickup_range: f32,
    /// Drop-off reach on each of X and Z
    pub dropoff_range: f32,
    /// Pick-ups and drop-offs only happen below this speed
    pub stop_speed: f32,
    /// Seconds of bonus time per unit of pick-up to drop-off distance
    pub time_per_distance_unit: f32,
    /// Forward acceleration at full throttle
    pub engine_force: f32,
    /// Fraction of horizontal velocity lost per second to rolling resistance
    pub rolling_resistance: f32,
    /// Yaw rate at full steering, radians per second
    pub steer_rate: f32,
    /// Engine force multiplier while submerged
    pub submerged_engine_factor: f32,
    /// Where a carried spirit rides, in chassis space
    pub carry_offset: [f32; 3],
    pub controller: ControllerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: 60.0,
            pickup_range: 17.0,
            dropoff_range: 40.0,
            stop_speed: 0.2,
            time_per_distance_unit: 0.016,
            engine_force: 40.0,
            rolling_resistance: 0.8,
            steer_rate: 2.0,
            submerged_engine_factor: 0.4,
            carry_offset: [0.0, 3.0, -3.0],
            controller: ControllerConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, GameError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
