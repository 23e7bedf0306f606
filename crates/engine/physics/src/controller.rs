//! Vehicle physics controller
//!
//! Resolves one chassis against a level's [`GridIndex`] once per frame:
//!
//! 1. **Integration**: external acceleration plus gravity, exact for a constant
//!    acceleration over the tick.
//! 2. **Floor**: the highest floor face under the candidate position, within a
//!    band around it, becomes the ground; the body snaps onto it and loses its
//!    vertical velocity.
//! 3. **Walls**: wall faces within the body radius push the candidate back out on
//!    the side the body came from and cancel the velocity into them.
//! 4. **Ceiling**: a rising body's head stops under ceiling faces.
//! 5. **Water**: below the water level, velocity is damped.
//!
//! There is no ground at infinity: a body over unpopulated cells just keeps
//! falling. Non-finite state is not sanitized.

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::face::FaceKind;
use crate::grid::{CellKey, GridIndex};
use crate::vector::Vector3;

/// Where inactive bodies are parked, far outside any level's grid
pub const PARKED_POSITION: Vector3 = Vector3::new(-10000.0, -10000.0, -10000.0);

/// Controller tuning
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Downward acceleration in units/s²
    pub gravity: f32,
    /// Horizontal body radius used against walls
    pub radius: f32,
    /// Height above the body origin at which walls are probed
    pub wall_probe_height: f32,
    /// How far a wall hit may lie outside a face's edges and still count
    pub wall_edge_tolerance: f32,
    /// Highest floor step the body climbs without a wall stopping it
    pub step_height: f32,
    /// How far below the candidate a grounded body still sticks to the floor
    pub ground_snap: f32,
    /// Distance from the body origin to the top of the body
    pub head_height: f32,
    /// Fraction of velocity lost per second while submerged
    pub water_drag: f32,
    /// Wall resolution passes per tick
    pub wall_iterations: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            radius: 2.5,
            wall_probe_height: 1.5,
            wall_edge_tolerance: 0.1,
            step_height: 1.0,
            ground_snap: 1.0,
            head_height: 3.0,
            water_drag: 6.0,
            wall_iterations: 3,
        }
    }
}

/// A payload riding on the chassis without colliding
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarriedPayload {
    /// Caller-side identifier of the payload entity
    pub id: usize,
    /// Offset from the chassis origin in chassis space (+Z is forward)
    pub offset: Vector3,
}

/// The simulated body
#[derive(Clone, Debug, PartialEq)]
pub struct Chassis {
    pub position: Vector3,
    pub velocity: Vector3,
    /// XYZ Euler angles in radians
    pub rotation: Vector3,
    /// Yaw chosen by steering; `rotation` follows it while grounded
    pub heading: f32,
    /// External acceleration (throttle/steering), applied on every tick
    pub acceleration: Vector3,
    pub carried: Option<CarriedPayload>,
    /// Inactive bodies are skipped by the controller
    pub active: bool,
    pub grounded: bool,
    pub submerged: bool,
    pub ground_normal: Vector3,
}

impl Chassis {
    pub fn new(position: Vector3) -> Self {
        Self {
            position,
            velocity: Vector3::ZERO,
            rotation: Vector3::ZERO,
            heading: 0.0,
            acceleration: Vector3::ZERO,
            carried: None,
            active: true,
            grounded: false,
            submerged: false,
            ground_normal: Vector3::UP,
        }
    }

    /// Deactivate and move to [`PARKED_POSITION`]
    pub fn park(&mut self) {
        self.active = false;
        self.position = PARKED_POSITION;
        self.velocity = Vector3::ZERO;
        self.acceleration = Vector3::ZERO;
        self.grounded = false;
        self.submerged = false;
    }

    /// Reactivate at `position` with no motion
    pub fn activate_at(&mut self, position: Vector3) {
        self.active = true;
        self.position = position;
        self.velocity = Vector3::ZERO;
        self.acceleration = Vector3::ZERO;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    /// Unit forward direction on the floor plane for the current heading
    pub fn forward(&self) -> Vector3 {
        Vector3::new(self.heading.sin(), 0.0, self.heading.cos())
    }

    /// World position of the carried payload, if any
    pub fn payload_world_position(&self) -> Option<Vector3> {
        let payload = self.carried?;
        let (sin, cos) = self.heading.sin_cos();
        let o = payload.offset;
        let mut world = self.position;
        world.add(&Vector3::new(
            o.x * cos + o.z * sin,
            o.y,
            -o.x * sin + o.z * cos,
        ));
        Some(world)
    }
}

/// What happened during one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    pub grounded: bool,
    pub submerged: bool,
    /// Height of the supporting floor, when grounded
    pub floor_height: Option<f32>,
    /// Wall pushes applied this tick
    pub wall_contacts: u32,
}

/// Per-frame resolver for one [`Chassis`]
#[derive(Clone, Debug)]
pub struct VehicleController {
    pub chassis: Chassis,
    pub config: ControllerConfig,
    cells: Vec<CellKey>,
    ids: Vec<usize>,
}

impl VehicleController {
    pub fn new(chassis: Chassis, config: ControllerConfig) -> Self {
        Self {
            chassis,
            config,
            cells: Vec::new(),
            ids: Vec::new(),
        }
    }

    pub fn set_acceleration(&mut self, acceleration: Vector3) {
        self.chassis.acceleration = acceleration;
    }

    /// Advance the chassis by `dt` seconds against `grid`
    ///
    /// Identical chassis state, grid, water level and `dt` always produce an
    /// identical result.
    pub fn update(&mut self, grid: &GridIndex, water_level: f32, dt: f32) -> TickReport {
        let Self {
            chassis: body,
            config,
            cells,
            ids,
        } = self;

        if !body.active {
            return TickReport::default();
        }

        let start = body.position;
        let was_grounded = body.grounded;

        // Integration
        let mut acceleration = body.acceleration;
        acceleration.y -= config.gravity;
        let mut candidate = start;
        candidate
            .add_scaled(&body.velocity, dt)
            .add_scaled(&acceleration, 0.5 * dt * dt);
        body.velocity.add_scaled(&acceleration, dt);

        collect_cells(grid, &start, &candidate, config.radius, cells);

        // Floor
        collect_ids(grid, cells, FaceKind::Floor, ids);
        let stick_to_ground = was_grounded && body.velocity.y <= 0.0;
        let floor = find_floor(grid, ids, config, &start, &candidate, stick_to_ground);
        let floor_height = match floor {
            Some((height, normal)) => {
                candidate.y = height;
                body.velocity.y = 0.0;
                body.grounded = true;
                body.ground_normal = normal;
                Some(height)
            }
            None => {
                body.grounded = false;
                body.ground_normal = Vector3::UP;
                None
            }
        };

        // Walls
        collect_ids(grid, cells, FaceKind::Wall, ids);
        let wall_contacts = resolve_walls(grid, ids, config, &start, &mut candidate, &mut body.velocity);

        // Ceiling
        if body.velocity.y > 0.0 {
            collect_ids(grid, cells, FaceKind::Ceiling, ids);
            resolve_ceiling(grid, ids, config, &start, &mut candidate, &mut body.velocity);
        }

        body.position = candidate;

        // Water
        body.submerged = body.position.y < water_level;
        if body.submerged {
            body.velocity.scale((1.0 - config.water_drag * dt).max(0.0));
        }

        if body.grounded {
            align_to_ground(body);
        }

        TickReport {
            grounded: body.grounded,
            submerged: body.submerged,
            floor_height,
            wall_contacts,
        }
    }
}

/// Distinct cells under the body footprint at both ends of the move
fn collect_cells(
    grid: &GridIndex,
    start: &Vector3,
    candidate: &Vector3,
    radius: f32,
    out: &mut Vec<CellKey>,
) {
    out.clear();
    for point in [start, candidate] {
        for key in grid.cells_around(point.x, point.z, radius) {
            if !out.contains(&key) {
                out.push(key);
            }
        }
    }
}

/// Distinct face ids of one category over `cells`, in first-seen order
fn collect_ids(grid: &GridIndex, cells: &[CellKey], kind: FaceKind, out: &mut Vec<usize>) {
    out.clear();
    for &key in cells {
        for &id in grid.bucket(key).ids(kind) {
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }
}

/// Highest floor under the candidate within the snap band
fn find_floor(
    grid: &GridIndex,
    ids: &[usize],
    config: &ControllerConfig,
    start: &Vector3,
    candidate: &Vector3,
    stick_to_ground: bool,
) -> Option<(f32, Vector3)> {
    let top = start.y.max(candidate.y) + config.step_height;
    let bottom = if stick_to_ground {
        candidate.y - config.ground_snap
    } else {
        candidate.y
    };

    let mut best: Option<(f32, Vector3)> = None;
    for &id in ids {
        let face = grid.face(FaceKind::Floor, id);
        if !face.contains_xz(candidate.x, candidate.z) {
            continue;
        }
        let Some(height) = face.height_at(candidate.x, candidate.z) else {
            continue;
        };
        if height < bottom || height > top {
            continue;
        }
        if best.map_or(true, |(best_height, _)| height > best_height) {
            best = Some((height, face.normal));
        }
    }
    best
}

/// Push the candidate out of nearby walls; returns the number of pushes
fn resolve_walls(
    grid: &GridIndex,
    ids: &[usize],
    config: &ControllerConfig,
    start: &Vector3,
    candidate: &mut Vector3,
    velocity: &mut Vector3,
) -> u32 {
    let mut contacts = 0;
    let mut probe_start = *start;
    probe_start.y += config.wall_probe_height;

    for _ in 0..config.wall_iterations {
        let mut pushed = false;

        for &id in ids {
            let face = grid.face(FaceKind::Wall, id);
            let mut probe = *candidate;
            probe.y += config.wall_probe_height;

            // Resolve towards the side the body started on
            let start_distance = face.signed_distance(&probe_start);
            let side = if start_distance >= 0.0 { 1.0 } else { -1.0 };
            let before = start_distance * side;
            let after = face.signed_distance(&probe) * side;
            if after >= config.radius {
                continue;
            }

            // A move that crossed the plane is tested where it crossed
            let mut contact = probe;
            if after < 0.0 && before > 0.0 {
                contact = probe_start;
                contact.lerp(&probe, before / (before - after));
            }
            let mut on_plane = contact;
            on_plane.add_scaled(&face.normal, -face.signed_distance(&contact));
            if face.closest_point(&on_plane).distance_to(&on_plane) > config.wall_edge_tolerance {
                continue;
            }

            let mut push_direction = face.normal;
            push_direction.scale(side);
            push_direction.y = 0.0;
            push_direction.normalize();
            let along_normal = push_direction.dot(&face.normal) * side;
            if along_normal <= f32::EPSILON {
                continue;
            }

            candidate.add_scaled(&push_direction, (config.radius - after) / along_normal);
            let into_wall = velocity.dot(&push_direction);
            if into_wall < 0.0 {
                velocity.add_scaled(&push_direction, -into_wall);
            }

            tracing::trace!("Wall {} pushed body by {:.3}", id, config.radius - after);
            contacts += 1;
            pushed = true;
        }

        if !pushed {
            break;
        }
    }
    contacts
}

/// Stop a rising body's head under the lowest ceiling it would pass
fn resolve_ceiling(
    grid: &GridIndex,
    ids: &[usize],
    config: &ControllerConfig,
    start: &Vector3,
    candidate: &mut Vector3,
    velocity: &mut Vector3,
) {
    let head_before = start.y + config.head_height;
    let head_after = candidate.y + config.head_height;

    let mut lowest: Option<f32> = None;
    for &id in ids {
        let face = grid.face(FaceKind::Ceiling, id);
        if !face.contains_xz(candidate.x, candidate.z) {
            continue;
        }
        let Some(height) = face.height_at(candidate.x, candidate.z) else {
            continue;
        };
        if height >= head_before && height < head_after && lowest.map_or(true, |low| height < low) {
            lowest = Some(height);
        }
    }

    if let Some(height) = lowest {
        candidate.y = height - config.head_height;
        velocity.y = 0.0;
    }
}

/// Pitch and roll from the ground normal, yaw from the heading
fn align_to_ground(body: &mut Chassis) {
    let up = Vec3::from(body.ground_normal).normalize_or(Vec3::Y);
    let heading = Vec3::new(body.heading.sin(), 0.0, body.heading.cos());
    let forward = (heading - up * heading.dot(up)).normalize_or(Vec3::Z);
    let right = up.cross(forward);

    let basis = Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        glam::Vec4::W,
    );
    body.rotation.set_from_rotation_matrix(&basis);
}
