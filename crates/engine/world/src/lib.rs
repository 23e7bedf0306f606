mod error;
mod geometry;
mod heightmap;
mod level;
mod registry;

pub use error::LevelError;
pub use geometry::{box_geometry, placement, plane_geometry, ramp_geometry};
pub use heightmap::{noise_landscape, HeightRemap, Heightmap, NoiseKind, NoiseParams};
pub use level::{
    Level, LevelConfig, LevelMaterials, LevelSurfaces, RampConfig, SpiritConfig, SpiritSpot,
    TerrainConfig,
};
pub use registry::{Material, Registry, Skybox};
