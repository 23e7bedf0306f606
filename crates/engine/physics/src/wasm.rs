use crate::{
    classify::{classify_faces_with, ClassifierConfig, Geometry},
    controller::{Chassis, ControllerConfig, VehicleController},
    grid::{GridConfig, GridIndex},
    vector::Vector3,
};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Static level collision: geometry in, grid out
#[wasm_bindgen]
pub struct WasmLevel {
    geometries: RefCell<Vec<Geometry>>,
    grid: RefCell<GridIndex>,
}

impl Default for WasmLevel {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmLevel {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            geometries: RefCell::new(Vec::new()),
            grid: RefCell::new(GridIndex::empty()),
        }
    }

    /// Queue a world-space triangle buffer
    ///
    /// # Arguments
    /// * `positions` - Flat `x, y, z` vertex positions
    /// * `indices` - Triangle indices; empty for a non-indexed buffer
    #[wasm_bindgen(js_name = addGeometry)]
    pub fn add_geometry(&self, positions: Vec<f32>, indices: Vec<u32>) {
        let geometry = if indices.is_empty() {
            Geometry::from_triangles(positions)
        } else {
            Geometry::new(positions, indices)
        };
        self.geometries.borrow_mut().push(geometry);
    }

    /// Classify the queued geometry and rebuild the grid from scratch
    ///
    /// # Returns
    /// Number of classified faces
    #[wasm_bindgen(js_name = build)]
    pub fn build(&self, cell_size: f32) -> Result<u32, JsValue> {
        let config = GridConfig { cell_size };
        if !config.is_valid() {
            return Err(JsValue::from_str(&format!("Invalid cell size: {}", cell_size)));
        }
        let faces = classify_faces_with(&self.geometries.borrow(), &ClassifierConfig::default())
            .map_err(|e| JsValue::from_str(&format!("Geometry error: {}", e)))?;
        let count = faces.len() as u32;
        *self.grid.borrow_mut() = GridIndex::build(faces, &config);
        Ok(count)
    }

    /// Drop all geometry and collision, ready for the next level
    #[wasm_bindgen(js_name = clear)]
    pub fn clear(&self) {
        self.geometries.borrow_mut().clear();
        *self.grid.borrow_mut() = GridIndex::empty();
    }

    /// Number of occupied grid cells
    #[wasm_bindgen(js_name = cellCount)]
    pub fn cell_count(&self) -> u32 {
        self.grid.borrow().stats().cells as u32
    }
}

/// One simulated chassis
#[wasm_bindgen]
pub struct WasmVehicle {
    inner: RefCell<VehicleController>,
}

#[wasm_bindgen]
impl WasmVehicle {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            inner: RefCell::new(VehicleController::new(
                Chassis::new(Vector3::new(x, y, z)),
                ControllerConfig::default(),
            )),
        }
    }

    #[wasm_bindgen(js_name = setAcceleration)]
    pub fn set_acceleration(&self, x: f32, y: f32, z: f32) {
        self.inner
            .borrow_mut()
            .set_acceleration(Vector3::new(x, y, z));
    }

    #[wasm_bindgen(js_name = setHeading)]
    pub fn set_heading(&self, heading: f32) {
        self.inner.borrow_mut().chassis.heading = heading;
    }

    /// Step the chassis forward by dt seconds
    ///
    /// # Returns
    /// Whether the chassis ended the tick on a floor
    #[wasm_bindgen(js_name = update)]
    pub fn update(&self, level: &WasmLevel, water_level: f32, dt: f32) -> bool {
        let grid = level.grid.borrow();
        self.inner.borrow_mut().update(&grid, water_level, dt).grounded
    }

    /// Position as `[x, y, z]`
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> Vec<f32> {
        self.inner.borrow().chassis.position.to_array().to_vec()
    }

    /// Velocity as `[x, y, z]`
    #[wasm_bindgen(js_name = getVelocity)]
    pub fn get_velocity(&self) -> Vec<f32> {
        self.inner.borrow().chassis.velocity.to_array().to_vec()
    }

    /// Euler rotation as `[x, y, z]` in radians
    #[wasm_bindgen(js_name = getRotation)]
    pub fn get_rotation(&self) -> Vec<f32> {
        self.inner.borrow().chassis.rotation.to_array().to_vec()
    }

    #[wasm_bindgen(js_name = isSubmerged)]
    pub fn is_submerged(&self) -> bool {
        self.inner.borrow().chassis.submerged
    }

    #[wasm_bindgen(js_name = park)]
    pub fn park(&self) {
        self.inner.borrow_mut().chassis.park();
    }

    #[wasm_bindgen(js_name = activateAt)]
    pub fn activate_at(&self, x: f32, y: f32, z: f32) {
        self.inner
            .borrow_mut()
            .chassis
            .activate_at(Vector3::new(x, y, z));
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn floor_level() -> WasmLevel {
        let level = WasmLevel::new();
        level.add_geometry(
            vec![
                -20.0, 0.0, -20.0, -20.0, 0.0, 20.0, 20.0, 0.0, 20.0, 20.0, 0.0, -20.0,
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        level
    }

    #[wasm_bindgen_test]
    fn test_build_counts_faces() {
        let level = floor_level();
        assert_eq!(level.build(32.0).unwrap(), 2);
        assert!(level.cell_count() > 0);

        level.clear();
        assert_eq!(level.cell_count(), 0);
    }

    #[wasm_bindgen_test]
    fn test_build_rejects_bad_cell_size() {
        let level = floor_level();
        assert!(level.build(0.0).is_err());
        assert!(level.build(f32::NAN).is_err());
    }

    #[wasm_bindgen_test]
    fn test_vehicle_lands_on_floor() {
        let level = floor_level();
        level.build(32.0).unwrap();

        let vehicle = WasmVehicle::new(0.0, 0.0, 0.0);
        let grounded = vehicle.update(&level, -100.0, 1.0 / 60.0);
        assert!(grounded);
        assert_eq!(vehicle.get_position()[1], 0.0);
    }

    #[wasm_bindgen_test]
    fn test_parked_vehicle_does_not_move() {
        let level = floor_level();
        level.build(32.0).unwrap();

        let vehicle = WasmVehicle::new(0.0, 5.0, 0.0);
        vehicle.park();
        let before = vehicle.get_position();
        assert!(!vehicle.update(&level, -100.0, 1.0 / 60.0));
        assert_eq!(vehicle.get_position(), before);
    }
}
