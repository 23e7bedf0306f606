//! The bundled levels load into usable collision

use ferryman_world::{Level, LevelConfig, Registry};

fn load(number: usize) -> Level {
    let registry = Registry::builtin().unwrap();
    let config = LevelConfig::builtin(number).unwrap();
    Level::load(&config, &registry).unwrap()
}

#[test]
fn test_every_builtin_level_loads() {
    for number in 0..LevelConfig::builtin_count() {
        let level = load(number);
        let faces = level.grid.face_group();

        // 255 x 255 terrain quads, two triangles each
        assert!(faces.len() >= 255 * 255 * 2, "{}: terrain missing", level.name);
        assert!(!faces.floor_faces.is_empty());
        assert!(level.grid.stats().cells > 1000);
        assert_eq!(level.drop_offs.len(), 4);
        assert_eq!(level.spirits.len(), 8);

        if let Some(ground) = level.ground_height_at(level.spawn.x, level.spawn.z) {
            assert!(level.spawn.y > ground, "{}: spawn below ground", level.name);
        }
        for spirit in &level.spirits {
            if let Some(ground) = level.ground_height_at(spirit.position.x, spirit.position.z) {
                assert_eq!(ground, spirit.position.y);
            }
        }
    }
}

#[test]
fn test_ramps_add_ceiling_faces() {
    // Terrain never faces down; only ramp bottoms do
    let expected_ramps = [0, 10, 3];
    for (number, ramps) in expected_ramps.into_iter().enumerate() {
        let level = load(number);
        assert_eq!(
            level.grid.face_group().ceiling_faces.len(),
            ramps * 2,
            "{}",
            level.name
        );
    }
}

#[test]
fn test_purgatory_layout() {
    let level = load(1);
    assert_eq!(level.active_spirits().count(), 4);
    assert!(level.water_level < -1000.0);

    let (lo, hi) = level.heightmap.range();
    assert!(lo >= -50.0 && hi <= 50.0);
}

#[test]
fn test_loading_is_deterministic() {
    let a = load(2);
    let b = load(2);
    assert_eq!(a.heightmap, b.heightmap);
    assert_eq!(a.grid.stats(), b.grid.stats());
    assert_eq!(a.spawn, b.spawn);
}
