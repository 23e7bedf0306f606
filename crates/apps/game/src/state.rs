//! Level lifecycle and the pick-up/drop-off loop
//!
//! [`GameState`] owns the loaded [`Level`] and the player's vehicle. Entering a
//! level swaps the previous one out as a whole; until a level is entered,
//! [`GameState::update`] does nothing.

use ferryman_physics::{CarriedPayload, Chassis, TickReport, Vector3, VehicleController};
use ferryman_world::Level;

use crate::config::GameConfig;
use crate::hud::Hud;
use crate::input::DriveInput;

/// A spirit still waiting on the map, or riding with the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spirit {
    /// Position in the level's spirit list
    pub id: usize,
    pub position: Vector3,
    /// Index of the drop-off the spirit wants to reach
    pub drop_off: usize,
}

/// Gameplay moments worth a sound or a log line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PickedUp { spirit: usize, time_bonus: f32 },
    DroppedOff { spirit: usize },
}

/// Result of a level whose clock ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOutcome {
    pub spirits_transported: u32,
    pub score: u32,
    pub level: usize,
}

pub struct GameState {
    config: GameConfig,
    level: Option<Level>,
    level_number: usize,
    vehicle: VehicleController,
    spirits: Vec<Spirit>,
    carried: Option<Spirit>,
    hud: Hud,
    spirits_transported: u32,
    last_report: TickReport,
}

impl GameState {
    /// Game with no level loaded; the vehicle waits parked
    pub fn new(config: GameConfig) -> Self {
        let mut chassis = Chassis::new(Vector3::ZERO);
        chassis.park();
        Self {
            vehicle: VehicleController::new(chassis, config.controller),
            hud: Hud::new(config.round_seconds),
            config,
            level: None,
            level_number: 0,
            spirits: Vec::new(),
            carried: None,
            spirits_transported: 0,
            last_report: TickReport::default(),
        }
    }

    /// Replace the current level and reset the round
    pub fn enter_level(&mut self, level: Level, level_number: usize) {
        let chassis = &mut self.vehicle.chassis;
        chassis.activate_at(level.spawn);
        chassis.heading = 0.0;
        chassis.grounded = false;
        chassis.submerged = false;
        chassis.carried = None;

        self.spirits = level
            .spirits
            .iter()
            .enumerate()
            .step_by(level.spirit_stride.max(1))
            .map(|(id, spot)| Spirit {
                id,
                position: spot.position,
                drop_off: spot.drop_off,
            })
            .collect();
        self.carried = None;
        self.spirits_transported = 0;
        self.hud.reset(self.config.round_seconds);
        self.last_report = TickReport::default();

        tracing::info!(
            "Entered level {} '{}' with {} spirits",
            level_number,
            level.name,
            self.spirits.len()
        );
        self.level_number = level_number;
        self.level = Some(level);
    }

    /// Unload the current level and park the vehicle
    pub fn leave_level(&mut self) -> Option<Level> {
        self.vehicle.chassis.park();
        self.vehicle.chassis.carried = None;
        self.carried = None;
        self.spirits.clear();
        self.level.take()
    }

    /// Advance one frame
    ///
    /// Returns the outcome once the clock runs out; the level is left at that
    /// point and later calls do nothing until the next [`GameState::enter_level`].
    pub fn update(&mut self, dt: f32, input: &DriveInput) -> Option<LevelOutcome> {
        let level = self.level.as_ref()?;

        input.apply(&mut self.vehicle.chassis, &self.config, dt);
        self.last_report = self.vehicle.update(&level.grid, level.water_level, dt);

        if let Some(event) = self.handle_drop_off_pick_up() {
            tracing::info!("{:?}", event);
        }

        self.hud.tick(dt);
        if !self.hud.is_time_up() {
            return None;
        }

        let outcome = LevelOutcome {
            spirits_transported: self.spirits_transported,
            score: self.hud.score,
            level: self.level_number,
        };
        tracing::info!(
            "Level {} over: {} spirits transported, score {}",
            outcome.level,
            outcome.spirits_transported,
            outcome.score
        );
        self.leave_level();
        Some(outcome)
    }

    /// Pick up a nearby spirit or deliver the carried one, when stopped
    pub fn handle_drop_off_pick_up(&mut self) -> Option<GameEvent> {
        let level = self.level.as_ref()?;
        let chassis = &self.vehicle.chassis;
        if chassis.speed() >= self.config.stop_speed {
            return None;
        }
        let position = chassis.position;

        if let Some(spirit) = self.carried {
            let drop_off = level.drop_offs.get(spirit.drop_off)?;
            let range = self.config.dropoff_range;
            if (drop_off.x - position.x).abs() > range || (drop_off.z - position.z).abs() > range {
                return None;
            }

            self.carried = None;
            self.vehicle.chassis.carried = None;
            self.spirits_transported += 1;
            return Some(GameEvent::DroppedOff { spirit: spirit.id });
        }

        let range = self.config.pickup_range;
        let index = self.spirits.iter().position(|spirit| {
            (spirit.position.x - position.x).abs() < range
                && (spirit.position.z - position.z).abs() < range
        })?;
        let drop_off = *level.drop_offs.get(self.spirits[index].drop_off)?;
        let spirit = self.spirits.remove(index);

        // Bonus time grows with the horizontal trip to the drop-off
        let mut trip = Vector3::ZERO;
        trip.subtract_vectors(&drop_off, &spirit.position);
        trip.y = 0.0;
        let time_bonus = trip.magnitude() * self.config.time_per_distance_unit;
        self.hud.add_time_bonus(time_bonus);
        self.hud.score += time_bonus.round() as u32;

        self.carried = Some(spirit);
        self.vehicle.chassis.carried = Some(CarriedPayload {
            id: spirit.id,
            offset: Vector3::from(self.config.carry_offset),
        });
        Some(GameEvent::PickedUp {
            spirit: spirit.id,
            time_bonus,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.level.is_some()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn chassis(&self) -> &Chassis {
        &self.vehicle.chassis
    }

    pub fn chassis_mut(&mut self) -> &mut Chassis {
        &mut self.vehicle.chassis
    }

    pub fn spirits(&self) -> &[Spirit] {
        &self.spirits
    }

    pub fn carried(&self) -> Option<&Spirit> {
        self.carried.as_ref()
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn spirits_transported(&self) -> u32 {
        self.spirits_transported
    }

    /// Controller report from the latest tick
    pub fn last_report(&self) -> TickReport {
        self.last_report
    }
}
