//! Spatial grid index over classified faces
//!
//! The floor plane is cut into square cells of a fixed size. Each face is
//! registered in every cell its floor-plane projection overlaps, which always
//! includes the cells of its corners, so a per-frame query only has to look at
//! the handful of faces near the body.
//! Buckets hold indices into the level's [`FaceGroup`]; a face spanning several
//! cells is referenced from each of them, never copied.
//!
//! The index is built once per level and thrown away on level change.

use std::collections::HashMap;

use serde::Deserialize;

use crate::classify::FaceGroup;
use crate::face::{Face, FaceKind};
use crate::vector::Vector3;

/// Default cell edge length in world units
///
/// Larger than the distance a body covers in one frame at full speed, so a
/// tick never skips over a whole cell.
pub const DEFAULT_CELL_SIZE: f32 = 32.0;

static EMPTY_BUCKET: CellBucket = CellBucket {
    floor: Vec::new(),
    wall: Vec::new(),
    ceiling: Vec::new(),
};

/// Integer key of a grid cell on the floor plane (height is ignored)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct CellKey {
    pub x: i32,
    pub z: i32,
}

impl CellKey {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cell containing `point` for the given cell size
    pub fn from_point(point: &Vector3, cell_size: f32) -> Self {
        Self::from_xz(point.x, point.z, cell_size)
    }

    pub fn from_xz(x: f32, z: f32, cell_size: f32) -> Self {
        Self {
            x: (x / cell_size).floor() as i32,
            z: (z / cell_size).floor() as i32,
        }
    }

}

/// Cell key of `point` using [`DEFAULT_CELL_SIZE`]
pub fn grid_position(point: &Vector3) -> CellKey {
    CellKey::from_point(point, DEFAULT_CELL_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: f32,
}

impl GridConfig {
    /// Whether `cell_size` is a usable positive, finite length
    pub fn is_valid(&self) -> bool {
        self.cell_size.is_finite() && self.cell_size > 0.0
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Face references of one cell, split by category
///
/// Each entry indexes the matching list of the grid's [`FaceGroup`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellBucket {
    pub floor: Vec<usize>,
    pub wall: Vec<usize>,
    pub ceiling: Vec<usize>,
}

impl CellBucket {
    pub fn ids(&self, kind: FaceKind) -> &[usize] {
        match kind {
            FaceKind::Floor => &self.floor,
            FaceKind::Wall => &self.wall,
            FaceKind::Ceiling => &self.ceiling,
        }
    }

    fn ids_mut(&mut self, kind: FaceKind) -> &mut Vec<usize> {
        match kind {
            FaceKind::Floor => &mut self.floor,
            FaceKind::Wall => &mut self.wall,
            FaceKind::Ceiling => &mut self.ceiling,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.floor.is_empty() && self.wall.is_empty() && self.ceiling.is_empty()
    }
}

/// Counts reported after a build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    pub cells: usize,
    pub floor_refs: usize,
    pub wall_refs: usize,
    pub ceiling_refs: usize,
}

/// Level faces bucketed by floor-plane cell
#[derive(Clone, Debug)]
pub struct GridIndex {
    faces: FaceGroup,
    cell_size: f32,
    cells: HashMap<CellKey, CellBucket>,
}

/// Build a grid with [`DEFAULT_CELL_SIZE`]
pub fn build_grid(faces: FaceGroup) -> GridIndex {
    GridIndex::build(faces, &GridConfig::default())
}

impl GridIndex {
    /// Bucket every face of `faces` into the cells it overlaps
    ///
    /// `config` must be valid (see [`GridConfig::is_valid`]).
    pub fn build(faces: FaceGroup, config: &GridConfig) -> Self {
        let cell_size = config.cell_size;
        let mut cells: HashMap<CellKey, CellBucket> = HashMap::new();

        for kind in [FaceKind::Floor, FaceKind::Wall, FaceKind::Ceiling] {
            for (id, face) in faces.faces(kind).iter().enumerate() {
                for key in covered_cells(face, cell_size) {
                    cells.entry(key).or_default().ids_mut(kind).push(id);
                }
            }
        }

        let grid = Self {
            faces,
            cell_size,
            cells,
        };
        let stats = grid.stats();
        tracing::debug!(
            "Built grid: {} cells, {} floor / {} wall / {} ceiling references",
            stats.cells,
            stats.floor_refs,
            stats.wall_refs,
            stats.ceiling_refs
        );
        grid
    }

    /// Grid with no faces; every query is open air
    pub fn empty() -> Self {
        Self::build(FaceGroup::default(), &GridConfig::default())
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_key(&self, point: &Vector3) -> CellKey {
        CellKey::from_point(point, self.cell_size)
    }

    /// Bucket for `key`; an unmapped cell yields the empty bucket
    pub fn bucket(&self, key: CellKey) -> &CellBucket {
        self.cells.get(&key).unwrap_or(&EMPTY_BUCKET)
    }

    pub fn face(&self, kind: FaceKind, id: usize) -> &Face {
        &self.faces.faces(kind)[id]
    }

    /// Faces of one category registered in `key`
    pub fn faces_at(&self, key: CellKey, kind: FaceKind) -> impl Iterator<Item = &Face> + '_ {
        let all = self.faces.faces(kind);
        self.bucket(key).ids(kind).iter().map(move |&id| &all[id])
    }

    /// Keys of all cells overlapped by the square `center ± half_extent`,
    /// in row-major order
    pub fn cells_around(&self, x: f32, z: f32, half_extent: f32) -> Vec<CellKey> {
        let min = CellKey::from_xz(x - half_extent, z - half_extent, self.cell_size);
        let max = CellKey::from_xz(x + half_extent, z + half_extent, self.cell_size);
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as usize;
        let mut keys = Vec::with_capacity(span(min.x, max.x).saturating_mul(span(min.z, max.z)));
        for cz in min.z..=max.z {
            for cx in min.x..=max.x {
                keys.push(CellKey::new(cx, cz));
            }
        }
        keys
    }

    /// Occupied cells (iteration order is unspecified)
    pub fn cells(&self) -> impl Iterator<Item = (&CellKey, &CellBucket)> {
        self.cells.iter()
    }

    pub fn face_group(&self) -> &FaceGroup {
        &self.faces
    }

    pub fn stats(&self) -> GridStats {
        self.cells.values().fold(
            GridStats {
                cells: self.cells.len(),
                ..GridStats::default()
            },
            |mut stats, bucket| {
                stats.floor_refs += bucket.floor.len();
                stats.wall_refs += bucket.wall.len();
                stats.ceiling_refs += bucket.ceiling.len();
                stats
            },
        )
    }
}

/// Cells overlapped by a face's floor-plane projection, in row-major order
fn covered_cells(face: &Face, cell_size: f32) -> Vec<CellKey> {
    let corners = face.points.map(|point| CellKey::from_point(&point, cell_size));
    let (min_x, min_z, max_x, max_z) = face.xz_bounds();
    let min = CellKey::from_xz(min_x, min_z, cell_size);
    let max = CellKey::from_xz(max_x, max_z, cell_size);

    let mut keys = Vec::new();
    for cz in min.z..=max.z {
        for cx in min.x..=max.x {
            let key = CellKey::new(cx, cz);
            let x = cx as f32 * cell_size;
            let z = cz as f32 * cell_size;
            // Corner cells are kept even when rounding puts the corner on the edge
            if corners.contains(&key)
                || face.overlaps_xz_rect(x, z, x + cell_size, z + cell_size)
            {
                keys.push(key);
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_faces, Geometry};

    fn floor_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Face {
        Face::from_points(a.into(), b.into(), c.into(), 1e-6).unwrap()
    }

    #[test]
    fn test_grid_position_is_stable() {
        let point = Vector3::new(100.5, -3.0, -0.25);
        let first = grid_position(&point);
        for _ in 0..10 {
            assert_eq!(grid_position(&point), first);
        }
        assert_eq!(first, CellKey::new(3, -1));
    }

    #[test]
    fn test_grid_position_ignores_height() {
        let low = grid_position(&Vector3::new(10.0, -500.0, 10.0));
        let high = grid_position(&Vector3::new(10.0, 500.0, 10.0));
        assert_eq!(low, high);
    }

    #[test]
    fn test_cell_boundaries_floor_towards_negative() {
        assert_eq!(CellKey::from_xz(0.0, 0.0, 32.0), CellKey::new(0, 0));
        assert_eq!(CellKey::from_xz(31.999, 31.999, 32.0), CellKey::new(0, 0));
        assert_eq!(CellKey::from_xz(32.0, 0.0, 32.0), CellKey::new(1, 0));
        assert_eq!(CellKey::from_xz(-0.001, 0.0, 32.0), CellKey::new(-1, 0));
    }

    #[test]
    fn test_face_in_single_cell() {
        let mut faces = FaceGroup::default();
        faces.push(
            FaceKind::Floor,
            floor_triangle([1.0, 0.0, 1.0], [1.0, 0.0, 5.0], [5.0, 0.0, 1.0]),
        );
        let grid = build_grid(faces);

        assert_eq!(grid.stats().cells, 1);
        assert_eq!(grid.bucket(CellKey::new(0, 0)).floor, vec![0]);
    }

    #[test]
    fn test_spanning_face_shared_across_cells() {
        let mut faces = FaceGroup::default();
        faces.push(
            FaceKind::Floor,
            floor_triangle([1.0, 0.0, 1.0], [1.0, 0.0, 60.0], [50.0, 0.0, 60.0]),
        );
        let grid = build_grid(faces);

        assert_eq!(grid.stats().cells, 3);
        for key in [CellKey::new(0, 0), CellKey::new(0, 1), CellKey::new(1, 1)] {
            assert_eq!(grid.bucket(key).floor, vec![0], "cell {key:?}");
        }
        assert!(grid.bucket(CellKey::new(1, 0)).is_empty());
    }

    #[test]
    fn test_long_face_registered_between_corner_cells() {
        // Corners only in cells z = 0 and z = 3
        let mut faces = FaceGroup::default();
        faces.push(
            FaceKind::Floor,
            floor_triangle([2.0, 0.0, 2.0], [2.0, 0.0, 100.0], [20.0, 0.0, 2.0]),
        );
        let grid = build_grid(faces);

        assert_eq!(grid.stats().cells, 4);
        for z in 0..4 {
            assert_eq!(grid.bucket(CellKey::new(0, z)).floor, vec![0], "cell z = {z}");
        }
        assert!(grid.bucket(CellKey::new(1, 0)).is_empty());
    }

    #[test]
    fn test_face_skips_cells_inside_bounds_it_misses() {
        // Bounds cover cells (0..=2, 0..=2), the face only the lower-left half
        let mut faces = FaceGroup::default();
        faces.push(
            FaceKind::Floor,
            floor_triangle([1.0, 0.0, 1.0], [1.0, 0.0, 90.0], [90.0, 0.0, 1.0]),
        );
        let grid = build_grid(faces);

        assert!(!grid.bucket(CellKey::new(1, 1)).is_empty());
        assert!(grid.bucket(CellKey::new(2, 2)).is_empty());
        assert!(grid.bucket(CellKey::new(2, 1)).is_empty());
        assert_eq!(grid.stats().cells, 6);
    }

    #[test]
    fn test_config_validity() {
        assert!(GridConfig::default().is_valid());
        for cell_size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            assert!(!GridConfig { cell_size }.is_valid(), "{cell_size}");
        }
    }

    #[test]
    fn test_unmapped_cell_is_empty_bucket() {
        let grid = GridIndex::empty();
        let bucket = grid.bucket(CellKey::new(-312, 9000));
        assert!(bucket.is_empty());
        assert_eq!(grid.faces_at(CellKey::new(0, 0), FaceKind::Wall).count(), 0);
    }

    #[test]
    fn test_categories_stay_separate() {
        let wall = Geometry::from_triangles(vec![
            0.0, 0.0, 0.0, //
            0.0, 10.0, 0.0, //
            0.0, 0.0, 10.0,
        ]);
        let floor = Geometry::from_triangles(vec![
            0.0, 0.0, 0.0, //
            0.0, 0.0, 10.0, //
            10.0, 0.0, 0.0,
        ]);
        let grid = build_grid(classify_faces(&[wall, floor]).unwrap());

        let bucket = grid.bucket(CellKey::new(0, 0));
        assert_eq!(bucket.floor, vec![0]);
        assert_eq!(bucket.wall, vec![0]);
        assert!(bucket.ceiling.is_empty());
        assert_eq!(grid.face(FaceKind::Wall, 0).normal.x, 1.0);
    }

    #[test]
    fn test_cells_around_covers_footprint() {
        let grid = GridIndex::empty();
        let keys = grid.cells_around(31.0, 0.5, 2.0);
        assert_eq!(
            keys,
            vec![
                CellKey::new(0, -1),
                CellKey::new(1, -1),
                CellKey::new(0, 0),
                CellKey::new(1, 0),
            ]
        );
        assert_eq!(grid.cells_around(10.0, 10.0, 1.0), vec![CellKey::new(0, 0)]);
    }

    #[test]
    fn test_custom_cell_size() {
        let mut faces = FaceGroup::default();
        faces.push(
            FaceKind::Floor,
            floor_triangle([1.0, 0.0, 1.0], [1.0, 0.0, 5.0], [5.0, 0.0, 1.0]),
        );
        let grid = GridIndex::build(faces, &GridConfig { cell_size: 2.5 });

        assert_eq!(grid.cell_size(), 2.5);
        assert_eq!(grid.stats().cells, 6);
        assert!(grid.bucket(CellKey::new(2, 2)).is_empty());
        assert_eq!(grid.cell_key(&Vector3::new(5.0, 0.0, 1.0)), CellKey::new(2, 0));
    }
}
