use ferryman_physics::{Chassis, Vector3};

use crate::config::GameConfig;

/// Driver controls for one frame, each axis in `-1.0..=1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveInput {
    /// Forward (positive) or reverse (negative) engine power
    pub throttle: f32,
    /// Left (positive) or right (negative) turn
    pub steer: f32,
}

impl DriveInput {
    pub fn new(throttle: f32, steer: f32) -> Self {
        Self {
            throttle: throttle.clamp(-1.0, 1.0),
            steer: steer.clamp(-1.0, 1.0),
        }
    }

    /// Turn the chassis and set its drive acceleration for the coming tick
    ///
    /// Wheels only bite on the ground: an airborne chassis coasts.
    pub fn apply(&self, chassis: &mut Chassis, config: &GameConfig, dt: f32) {
        if !chassis.grounded {
            chassis.acceleration = Vector3::ZERO;
            return;
        }

        chassis.heading += self.steer * config.steer_rate * dt;

        let mut engine = self.throttle * config.engine_force;
        if chassis.submerged {
            engine *= config.submerged_engine_factor;
        }

        let mut acceleration = chassis.forward();
        acceleration.scale(engine);

        let mut rolling = chassis.velocity;
        rolling.y = 0.0;
        acceleration.add_scaled(&rolling, -config.rolling_resistance);

        chassis.acceleration = acceleration;
    }
}
