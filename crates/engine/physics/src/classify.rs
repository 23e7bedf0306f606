//! Face classification
//!
//! Turns raw triangle geometry into floor, wall and ceiling sets by looking at
//! the vertical component of each triangle's normal. Runs once per level,
//! before the grid is built.

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::error::GeometryError;
use crate::face::{Face, FaceKind};
use crate::vector::Vector3;

/// Triangle geometry in world space
///
/// `positions` holds flat `x, y, z` triplets. Without `indices`, every three
/// consecutive vertices form a triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<f32>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Non-indexed geometry: vertices are consumed three at a time
    pub fn from_triangles(positions: Vec<f32>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertex(&self, index: usize) -> Vector3 {
        let i = index * 3;
        Vector3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// Copy with `transform` baked into every position
    pub fn transformed(&self, transform: &Mat4) -> Geometry {
        let positions = self
            .positions
            .chunks_exact(3)
            .flat_map(|p| {
                transform
                    .transform_point3(Vec3::new(p[0], p[1], p[2]))
                    .to_array()
            })
            .collect();
        Geometry {
            positions,
            indices: self.indices.clone(),
        }
    }

    /// Append another geometry, re-basing its indices
    pub fn merge(&mut self, other: &Geometry) {
        let base = self.vertex_count() as u32;
        let own = self
            .indices
            .take()
            .unwrap_or_else(|| (0..base).collect());
        let theirs: Vec<u32> = match &other.indices {
            Some(indices) => indices.iter().map(|i| i + base).collect(),
            None => (0..other.vertex_count() as u32).map(|i| i + base).collect(),
        };
        self.positions.extend_from_slice(&other.positions);
        self.indices = Some(own.into_iter().chain(theirs).collect());
    }

    /// Triangle corner indices, after checking buffer shapes
    fn triangles(&self, geometry: usize) -> Result<Vec<[usize; 3]>, GeometryError> {
        if self.positions.len() % 3 != 0 {
            return Err(GeometryError::PositionLength {
                geometry,
                len: self.positions.len(),
            });
        }
        if let Some(vertex) = self
            .positions
            .chunks_exact(3)
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(GeometryError::NonFiniteVertex { geometry, vertex });
        }

        let vertex_count = self.vertex_count();
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(GeometryError::IndexCount {
                        geometry,
                        len: indices.len(),
                    });
                }
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(GeometryError::IndexOutOfRange {
                        geometry,
                        index,
                        vertex_count,
                    });
                }
                Ok(indices
                    .chunks_exact(3)
                    .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
                    .collect())
            }
            None => {
                if vertex_count % 3 != 0 {
                    return Err(GeometryError::IndexCount {
                        geometry,
                        len: vertex_count,
                    });
                }
                Ok((0..vertex_count / 3)
                    .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                    .collect())
            }
        }
    }
}

/// Normal thresholds for classification
///
/// `normal.y > floor_threshold` is a floor, `normal.y < -ceiling_threshold` is a
/// ceiling, anything else (including exactly-at-threshold) is a wall.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub floor_threshold: f32,
    pub ceiling_threshold: f32,
    /// Triangles whose unnormalized normal is this short are dropped
    pub degenerate_epsilon: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            floor_threshold: 0.5,
            ceiling_threshold: 0.5,
            degenerate_epsilon: 1e-6,
        }
    }
}

impl ClassifierConfig {
    pub fn kind_of(&self, normal: &Vector3) -> FaceKind {
        if normal.y > self.floor_threshold {
            FaceKind::Floor
        } else if normal.y < -self.ceiling_threshold {
            FaceKind::Ceiling
        } else {
            FaceKind::Wall
        }
    }
}

/// Classified faces of one level
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceGroup {
    pub floor_faces: Vec<Face>,
    pub wall_faces: Vec<Face>,
    pub ceiling_faces: Vec<Face>,
}

impl FaceGroup {
    pub fn faces(&self, kind: FaceKind) -> &[Face] {
        match kind {
            FaceKind::Floor => &self.floor_faces,
            FaceKind::Wall => &self.wall_faces,
            FaceKind::Ceiling => &self.ceiling_faces,
        }
    }

    pub fn push(&mut self, kind: FaceKind, face: Face) {
        match kind {
            FaceKind::Floor => self.floor_faces.push(face),
            FaceKind::Wall => self.wall_faces.push(face),
            FaceKind::Ceiling => self.ceiling_faces.push(face),
        }
    }

    pub fn len(&self) -> usize {
        self.floor_faces.len() + self.wall_faces.len() + self.ceiling_faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify geometries with the default thresholds
pub fn classify_faces(geometries: &[Geometry]) -> Result<FaceGroup, GeometryError> {
    classify_faces_with(geometries, &ClassifierConfig::default())
}

/// Classify every triangle of `geometries` into a [`FaceGroup`]
///
/// Degenerate triangles are skipped. Malformed buffers fail the whole call so
/// that a broken level never produces a partial face set.
pub fn classify_faces_with(
    geometries: &[Geometry],
    config: &ClassifierConfig,
) -> Result<FaceGroup, GeometryError> {
    let mut group = FaceGroup::default();
    let mut degenerate = 0usize;

    for (geometry_index, geometry) in geometries.iter().enumerate() {
        for [a, b, c] in geometry.triangles(geometry_index)? {
            let face = Face::from_points(
                geometry.vertex(a),
                geometry.vertex(b),
                geometry.vertex(c),
                config.degenerate_epsilon,
            );
            match face {
                Some(face) => {
                    let kind = config.kind_of(&face.normal);
                    group.push(kind, face);
                }
                None => degenerate += 1,
            }
        }
    }

    if degenerate > 0 {
        tracing::warn!("Skipped {} degenerate triangles", degenerate);
    }
    tracing::debug!(
        "Classified {} faces: {} floor, {} wall, {} ceiling",
        group.len(),
        group.floor_faces.len(),
        group.wall_faces.len(),
        group.ceiling_faces.len()
    );

    Ok(group)
}
