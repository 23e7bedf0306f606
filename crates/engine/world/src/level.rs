//! Level descriptions and loading
//!
//! A [`LevelConfig`] is the TOML form of a level. [`Level::load`] turns it into
//! collision: terrain and props are generated, baked into world space,
//! classified and bucketed into a grid. The returned [`Level`] is complete; the
//! caller swaps it in as a whole, replacing the previous level's grid.

use std::path::Path;

use ferryman_physics::{
    classify_faces_with, ClassifierConfig, FaceKind, GridConfig, GridIndex, Vector3,
};
use glam::Vec3;
use serde::Deserialize;

use crate::error::LevelError;
use crate::geometry::{placement, plane_geometry, ramp_geometry};
use crate::heightmap::{noise_landscape, HeightRemap, Heightmap, NoiseParams};
use crate::registry::{Material, Registry, Skybox};

const BUILTIN_LEVELS: [&str; 3] = [
    include_str!("../levels/meadow.toml"),
    include_str!("../levels/purgatory.toml"),
    include_str!("../levels/underworld.toml"),
];

/// Clearance kept between the terrain and a spawn point
const SPAWN_CLEARANCE: f32 = 1.0;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_terrain_extent")]
    pub width: f32,
    #[serde(default = "default_terrain_extent")]
    pub depth: f32,
    pub noise: NoiseParams,
    #[serde(default)]
    pub remap: Vec<HeightRemap>,
}

fn default_terrain_extent() -> f32 {
    2048.0
}

/// Material names used by a level
#[derive(Clone, Debug, Deserialize)]
pub struct LevelMaterials {
    pub ground: String,
    #[serde(default)]
    pub path: Option<String>,
    pub grass: String,
    pub rocks: String,
    pub water: String,
    pub bark: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RampConfig {
    /// Centre of the ramp's bottom face
    pub position: [f32; 3],
    /// Yaw in radians
    pub rotation: f32,
    /// Width, height and length
    #[serde(default = "default_ramp_size")]
    pub size: [f32; 3],
}

fn default_ramp_size() -> [f32; 3] {
    [16.0, 11.0, 40.0]
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpiritConfig {
    pub position: [f32; 3],
    /// Index into the level's drop-off points
    pub drop_off: usize,
}

/// One level, as written in a level file
#[derive(Clone, Debug, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    pub skybox: String,
    /// Height below which bodies are submerged
    pub water_level: f32,
    #[serde(default = "default_spawn")]
    pub spawn: [f32; 3],
    /// Spawn every n-th spirit only
    #[serde(default = "default_spirit_stride")]
    pub spirit_stride: usize,
    pub materials: LevelMaterials,
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub ramps: Vec<RampConfig>,
    pub drop_offs: Vec<[f32; 3]>,
    #[serde(default)]
    pub spirits: Vec<SpiritConfig>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

fn default_spawn() -> [f32; 3] {
    [-60.0, 51.0, -245.0]
}

fn default_spirit_stride() -> usize {
    1
}

impl LevelConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, LevelError> {
        let config: LevelConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Number of bundled levels
    pub fn builtin_count() -> usize {
        BUILTIN_LEVELS.len()
    }

    /// One of the bundled levels, numbered from 0
    pub fn builtin(number: usize) -> Result<Self, LevelError> {
        let source = BUILTIN_LEVELS
            .get(number)
            .ok_or(LevelError::UnknownLevel(number))?;
        Self::from_toml_str(source)
    }

    /// Check references that the file format cannot express
    pub fn validate(&self) -> Result<(), LevelError> {
        for (spirit, config) in self.spirits.iter().enumerate() {
            if config.drop_off >= self.drop_offs.len() {
                return Err(LevelError::InvalidDropOff {
                    spirit,
                    drop_off: config.drop_off,
                    count: self.drop_offs.len(),
                });
            }
        }
        if !(self.terrain.width > 0.0 && self.terrain.depth > 0.0) {
            return Err(LevelError::InvalidTerrain(format!(
                "terrain size {}x{} is not positive",
                self.terrain.width, self.terrain.depth
            )));
        }
        for rule in &self.terrain.remap {
            rule.validate()?;
        }
        if !self.grid.is_valid() {
            return Err(LevelError::InvalidTerrain(format!(
                "grid cell size {} is not a positive length",
                self.grid.cell_size
            )));
        }
        Ok(())
    }
}

/// Surfaces resolved from the registry
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSurfaces {
    pub ground: Material,
    pub path: Option<Material>,
    pub grass: Material,
    pub rocks: Material,
    pub water: Material,
    pub bark: Material,
}

impl LevelSurfaces {
    fn resolve(names: &LevelMaterials, registry: &Registry) -> Result<Self, LevelError> {
        Ok(Self {
            ground: registry.material(&names.ground)?.clone(),
            path: names
                .path
                .as_deref()
                .map(|name| registry.material(name).cloned())
                .transpose()?,
            grass: registry.material(&names.grass)?.clone(),
            rocks: registry.material(&names.rocks)?.clone(),
            water: registry.material(&names.water)?.clone(),
            bark: registry.material(&names.bark)?.clone(),
        })
    }
}

/// A spirit waiting to be picked up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiritSpot {
    pub position: Vector3,
    pub drop_off: usize,
}

/// A loaded level, ready to drive on
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub water_level: f32,
    pub spawn: Vector3,
    pub skybox: Skybox,
    pub surfaces: LevelSurfaces,
    pub heightmap: Heightmap,
    pub grid: GridIndex,
    pub spirits: Vec<SpiritSpot>,
    pub spirit_stride: usize,
    pub drop_offs: Vec<Vector3>,
}

impl Level {
    pub fn load(config: &LevelConfig, registry: &Registry) -> Result<Level, LevelError> {
        config.validate()?;
        let skybox = registry.skybox(&config.skybox)?.clone();
        let surfaces = LevelSurfaces::resolve(&config.materials, registry)?;

        let terrain = &config.terrain;
        let heightmap = noise_landscape(&terrain.noise)?.remapped(&terrain.remap);
        let segments = heightmap.size() - 1;

        let mut geometries = vec![plane_geometry(
            terrain.width,
            terrain.depth,
            segments,
            segments,
            Some(&heightmap),
        )?];
        for ramp in &config.ramps {
            let [width, height, length] = ramp.size;
            let transform = placement(Vec3::from(ramp.position), ramp.rotation);
            geometries.push(ramp_geometry(width, height, length).transformed(&transform));
        }

        let faces = classify_faces_with(&geometries, &config.classifier)?;
        let grid = GridIndex::build(faces, &config.grid);

        let mut level = Level {
            name: config.name.clone(),
            water_level: config.water_level,
            spawn: Vector3::from(config.spawn),
            skybox,
            surfaces,
            heightmap,
            grid,
            spirits: Vec::with_capacity(config.spirits.len()),
            spirit_stride: config.spirit_stride.max(1),
            drop_offs: config.drop_offs.iter().copied().map(Vector3::from).collect(),
        };

        if let Some(ground) = level.ground_height_at(level.spawn.x, level.spawn.z) {
            level.spawn.y = level.spawn.y.max(ground + SPAWN_CLEARANCE);
        }
        for spirit in &config.spirits {
            let mut position = Vector3::from(spirit.position);
            if let Some(ground) = level.ground_height_at(position.x, position.z) {
                position.y = ground;
            }
            level.spirits.push(SpiritSpot {
                position,
                drop_off: spirit.drop_off,
            });
        }

        let stats = level.grid.stats();
        tracing::info!(
            "Loaded level '{}': {} floor / {} wall / {} ceiling faces in {} cells",
            level.name,
            level.grid.face_group().floor_faces.len(),
            level.grid.face_group().wall_faces.len(),
            level.grid.face_group().ceiling_faces.len(),
            stats.cells
        );
        Ok(level)
    }

    /// Highest floor at a floor-plane position, if any floor covers it
    pub fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.grid
            .cells_around(x, z, 1.0)
            .into_iter()
            .flat_map(|key| self.grid.faces_at(key, FaceKind::Floor))
            .filter(|face| face.contains_xz(x, z))
            .filter_map(|face| face.height_at(x, z))
            .reduce(f32::max)
    }

    /// The spirits actually placed in play, honouring `spirit_stride`
    pub fn active_spirits(&self) -> impl Iterator<Item = &SpiritSpot> + '_ {
        self.spirits.iter().step_by(self.spirit_stride.max(1))
    }
}
