//! Ramps stay drivable along their whole length

use ferryman_physics::{
    build_grid, classify_faces, CellKey, Chassis, ControllerConfig, FaceKind, Vector3,
    VehicleController,
};
use ferryman_world::{placement, ramp_geometry, Level, LevelConfig, Registry};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

/// Point on a ramp's slope, `t` running from the low edge (0) to the high edge (1)
fn slope_point(position: [f32; 3], yaw: f32, size: [f32; 3], t: f32) -> Vec3 {
    let [_, height, length] = size;
    let local = Vec3::new(0.0, height * t, length * (t - 0.5));
    placement(Vec3::from(position), yaw).transform_point3(local)
}

#[test]
fn test_ramp_slope_found_in_cell_without_corners() {
    // Spans z 30..70; cell z = 1 holds none of its corners
    let geometry = ramp_geometry(16.0, 11.0, 40.0)
        .transformed(&placement(Vec3::new(48.0, 0.0, 50.0), 0.0));
    let grid = build_grid(classify_faces(&[geometry]).unwrap());
    assert!(grid.faces_at(CellKey::new(1, 1), FaceKind::Floor).count() >= 1);
    assert!(grid.faces_at(CellKey::new(1, 1), FaceKind::Wall).count() >= 2);

    let mut chassis = Chassis::new(Vector3::new(48.0, 5.5, 50.0));
    chassis.grounded = true;
    let mut controller = VehicleController::new(chassis, ControllerConfig::default());

    let report = controller.update(&grid, -100.0, DT);
    assert!(report.grounded);
    let floor = report.floor_height.unwrap();
    assert!((floor - 5.5).abs() < 1e-3, "floor = {floor}");
}

#[test]
fn test_every_builtin_ramp_supports_its_centreline() {
    let registry = Registry::builtin().unwrap();
    for number in 0..LevelConfig::builtin_count() {
        let config = LevelConfig::builtin(number).unwrap();
        let level = Level::load(&config, &registry).unwrap();

        for (index, ramp) in config.ramps.iter().enumerate() {
            for step in 1..20 {
                let t = step as f32 / 20.0;
                let point = slope_point(ramp.position, ramp.rotation, ramp.size, t);
                let ground = level.ground_height_at(point.x, point.z);
                assert!(
                    ground.is_some_and(|height| height >= point.y - 1e-2),
                    "{} ramp {index} at t = {t}: ground {ground:?} below slope {}",
                    level.name,
                    point.y
                );
            }
        }
    }
}
