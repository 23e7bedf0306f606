//! Full rounds on a small flat level

use ferryman_game::{
    load_builtin_level, DriveInput, GameConfig, GameError, GameState, LevelOutcome,
};
use ferryman_physics::Vector3;
use ferryman_world::{Level, LevelConfig, Registry};

const DT: f32 = 1.0 / 60.0;

const FLATS: &str = r#"
    name = "Test Flats"
    skybox = "earth_sky"
    water_level = -5.0
    spawn = [0.0, 5.0, 0.0]
    drop_offs = [[100.0, 0.0, 0.0]]

    [materials]
    ground = "grass"
    grass = "grass"
    rocks = "marble"
    water = "lake"
    bark = "wood"

    [terrain]
    width = 256.0
    depth = 256.0

    [terrain.noise]
    size = 17
    seed = 1
    frequency = 0.1
    octaves = 1
    scale = 0.0

    [[spirits]]
    position = [5.0, 0.0, 5.0]
    drop_off = 0

    [[spirits]]
    position = [-80.0, 0.0, 80.0]
    drop_off = 0
"#;

fn flats(edit: impl FnOnce(&mut LevelConfig)) -> Level {
    let mut config = LevelConfig::from_toml_str(FLATS).unwrap();
    edit(&mut config);
    Level::load(&config, &Registry::builtin().unwrap()).unwrap()
}

fn run(game: &mut GameState, ticks: usize, input: DriveInput) {
    for _ in 0..ticks {
        assert!(game.update(DT, &input).is_none());
    }
}

#[test]
fn test_update_before_load_is_noop() {
    let mut game = GameState::new(GameConfig::default());
    assert!(!game.is_loaded());
    assert!(game.update(DT, &DriveInput::new(1.0, 0.0)).is_none());
    assert!(!game.chassis().active);
}

#[test]
fn test_pick_up_deliver_and_finish() {
    let mut game = GameState::new(GameConfig::default());
    game.enter_level(flats(|_| {}), 7);
    assert_eq!(game.spirits().len(), 2);

    // Fall onto the floor next to the first spirit and stop there
    run(&mut game, 120, DriveInput::default());
    assert!(game.last_report().grounded);
    assert_eq!(game.carried().map(|spirit| spirit.id), Some(0));
    assert_eq!(game.spirits().len(), 1);
    assert!(game.chassis().payload_world_position().is_some());

    let trip = (95.0f32 * 95.0 + 5.0 * 5.0).sqrt();
    let bonus = trip * GameConfig::default().time_per_distance_unit;
    assert!((game.hud().last_time_bonus - bonus).abs() < 1e-3);
    assert_eq!(game.hud().score, 2);

    // Park within reach of the drop-off
    let chassis = game.chassis_mut();
    chassis.position = Vector3::new(70.0, 0.0, 0.0);
    chassis.velocity = Vector3::ZERO;
    run(&mut game, 1, DriveInput::default());
    assert!(game.carried().is_none());
    assert!(game.chassis().carried.is_none());
    assert_eq!(game.spirits_transported(), 1);

    let mut outcome = None;
    for _ in 0..10_000 {
        outcome = game.update(DT, &DriveInput::default());
        if outcome.is_some() {
            break;
        }
    }
    assert_eq!(
        outcome,
        Some(LevelOutcome {
            spirits_transported: 1,
            score: 2,
            level: 7,
        })
    );
    assert!(!game.is_loaded());
    assert!(!game.chassis().active);
    assert!(game.update(DT, &DriveInput::default()).is_none());
}

#[test]
fn test_no_pick_up_while_moving() {
    let mut game = GameState::new(GameConfig::default());
    game.enter_level(
        flats(|config| config.spirits[0].position = [0.0, 0.0, 40.0]),
        0,
    );

    run(&mut game, 60, DriveInput::default());
    let throttle = DriveInput::new(1.0, 0.0);
    for _ in 0..600 {
        run(&mut game, 1, throttle);
        assert!(game.carried().is_none());
        if game.chassis().position.z > 60.0 {
            break;
        }
    }
    assert!(game.chassis().position.z > 60.0, "never drove past the spirit");
    assert_eq!(game.spirits().len(), 2);
}

#[test]
fn test_water_slows_driving() {
    let mut distances = Vec::new();
    for water_level in [-5.0, 10.0] {
        let mut game = GameState::new(GameConfig::default());
        game.enter_level(
            flats(|config| {
                config.water_level = water_level;
                config.spirits.clear();
            }),
            0,
        );

        run(&mut game, 200, DriveInput::default());
        assert!(game.last_report().grounded);
        let start = game.chassis().position.z;
        run(&mut game, 120, DriveInput::new(1.0, 0.0));
        distances.push(game.chassis().position.z - start);
    }

    let (dry, wet) = (distances[0], distances[1]);
    assert!(wet > 0.0);
    assert!(wet < dry, "wet {wet} vs dry {dry}");
}

#[test]
fn test_entering_level_resets_round() {
    let mut game = GameState::new(GameConfig::default());
    game.enter_level(flats(|_| {}), 0);
    run(&mut game, 120, DriveInput::default());
    assert!(game.carried().is_some());

    game.enter_level(flats(|_| {}), 1);
    assert!(game.carried().is_none());
    assert!(game.chassis().carried.is_none());
    assert_eq!(game.spirits().len(), 2);
    assert_eq!(game.hud().score, 0);
    assert_eq!(game.hud().time_remaining, GameConfig::default().round_seconds);
    assert_eq!(game.chassis().position, Vector3::new(0.0, 5.0, 0.0));
}

#[test]
fn test_unknown_level_number() {
    let registry = Registry::builtin().unwrap();
    let err = load_builtin_level(9, &registry).unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidLevelNumber {
            number: 9,
            count: 3
        }
    ));
}
