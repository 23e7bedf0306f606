//! Level mesh builders
//!
//! Every builder winds its triangles so the face normal `(b - a) × (c - a)`
//! points out of the solid, which is what face classification relies on.

use ferryman_physics::Geometry;
use glam::{Mat4, Quat, Vec3};

use crate::error::LevelError;
use crate::heightmap::Heightmap;

/// Terrain grid centred on the origin, `width` along X and `depth` along Z
///
/// With a heightmap, its size must be `segments + 1` on both axes.
pub fn plane_geometry(
    width: f32,
    depth: f32,
    segments_x: usize,
    segments_z: usize,
    heightmap: Option<&Heightmap>,
) -> Result<Geometry, LevelError> {
    if segments_x == 0 || segments_z == 0 {
        return Err(LevelError::InvalidTerrain("plane needs at least one segment".into()));
    }
    if !(width > 0.0 && depth > 0.0) {
        return Err(LevelError::InvalidTerrain(format!(
            "plane size {width}x{depth} is not positive"
        )));
    }
    if let Some(map) = heightmap {
        if map.size() != segments_x + 1 || map.size() != segments_z + 1 {
            return Err(LevelError::InvalidTerrain(format!(
                "{}x{} heightmap for a {}x{} segment plane",
                map.size(),
                map.size(),
                segments_x,
                segments_z
            )));
        }
    }

    let columns = segments_x + 1;
    let rows = segments_z + 1;
    let step_x = width / segments_x as f32;
    let step_z = depth / segments_z as f32;

    let mut positions = Vec::with_capacity(columns * rows * 3);
    for row in 0..rows {
        for col in 0..columns {
            let height = heightmap.map_or(0.0, |map| map.get(col, row));
            positions.extend_from_slice(&[
                col as f32 * step_x - width * 0.5,
                height,
                row as f32 * step_z - depth * 0.5,
            ]);
        }
    }

    let mut indices = Vec::with_capacity(segments_x * segments_z * 6);
    for row in 0..segments_z {
        for col in 0..segments_x {
            let i = (row * columns + col) as u32;
            let next_row = i + columns as u32;
            indices.extend_from_slice(&[i, next_row, next_row + 1, i, next_row + 1, i + 1]);
        }
    }

    Ok(Geometry::new(positions, indices))
}

/// Wedge rising along +Z: sloped top, vertical back and sides, flat bottom
///
/// The low edge sits at `z = -length / 2`, the high edge at `z = length / 2`,
/// and the bottom at `y = 0`.
pub fn ramp_geometry(width: f32, height: f32, length: f32) -> Geometry {
    let x = width * 0.5;
    let z = length * 0.5;
    let positions = vec![
        -x, 0.0, -z, // 0 front left
        x, 0.0, -z, // 1 front right
        x, 0.0, z, // 2 back right
        -x, 0.0, z, // 3 back left
        -x, height, z, // 4 top left
        x, height, z, // 5 top right
    ];
    let indices = vec![
        0, 4, 5, 0, 5, 1, // slope
        3, 2, 5, 3, 5, 4, // back
        0, 1, 2, 0, 2, 3, // bottom
        1, 5, 2, // right
        0, 3, 4, // left
    ];
    Geometry::new(positions, indices)
}

/// Axis-aligned box centred on the origin
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    let quads: [[[f32; 3]; 4]; 6] = [
        [[-x, y, -z], [-x, y, z], [x, y, z], [x, y, -z]],     // top
        [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]], // bottom
        [[x, -y, -z], [x, y, -z], [x, y, z], [x, -y, z]],     // +x
        [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]], // -x
        [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]],     // +z
        [[-x, -y, -z], [-x, y, -z], [x, y, -z], [x, -y, -z]], // -z
    ];

    let mut positions = Vec::with_capacity(6 * 4 * 3);
    let mut indices = Vec::with_capacity(6 * 6);
    for quad in &quads {
        let base = (positions.len() / 3) as u32;
        for corner in quad {
            positions.extend_from_slice(corner);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Geometry::new(positions, indices)
}

/// World transform for a mesh placed at `position` and turned `yaw` radians about Y
pub fn placement(position: Vec3, yaw: f32) -> Mat4 {
    Mat4::from_rotation_translation(Quat::from_rotation_y(yaw), position)
}
