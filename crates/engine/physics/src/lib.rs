//! Collision core for a grid-indexed vehicle world
//!
//! Level geometry is classified into floor, wall and ceiling faces once per
//! level, bucketed into a floor-plane grid, and then queried every frame by the
//! [`VehicleController`] to move a chassis over it.

mod classify;
mod controller;
mod error;
mod face;
mod grid;
mod vector;

// Only compile WASM bindings when "wasm" feature is enabled
#[cfg(feature = "wasm")]
mod wasm;

pub use classify::{classify_faces, classify_faces_with, ClassifierConfig, FaceGroup, Geometry};
pub use controller::{
    CarriedPayload, Chassis, ControllerConfig, TickReport, VehicleController, PARKED_POSITION,
};
pub use error::GeometryError;
pub use face::{Face, FaceKind};
pub use grid::{
    build_grid, grid_position, CellBucket, CellKey, GridConfig, GridIndex, GridStats,
    DEFAULT_CELL_SIZE,
};
pub use vector::Vector3;

// Re-export for convenience
pub use glam;

#[cfg(feature = "wasm")]
pub use wasm::{WasmLevel, WasmVehicle};
