//! Classified collision triangles

use crate::vector::Vector3;

/// Collision category of a face, decided by its normal's vertical component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceKind {
    Floor,
    Wall,
    Ceiling,
}

/// A collision triangle with its unit normal
///
/// Corners are kept exactly as they appeared in the source buffer; shared mesh
/// vertices are not welded.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub points: [Vector3; 3],
    pub normal: Vector3,
}

impl Face {
    /// Build a face from three corners, or `None` if the triangle has no area
    ///
    /// The normal is `(b - a) × (c - a)`, so counter-clockwise corners seen from
    /// above produce an upward normal.
    pub fn from_points(a: Vector3, b: Vector3, c: Vector3, epsilon: f32) -> Option<Face> {
        let mut edge1 = Vector3::ZERO;
        let mut edge2 = Vector3::ZERO;
        edge1.subtract_vectors(&b, &a);
        edge2.subtract_vectors(&c, &a);

        let mut normal = Vector3::ZERO;
        normal.cross_vectors(&edge1, &edge2);
        if normal.magnitude() <= epsilon {
            return None;
        }
        normal.normalize();

        Some(Face {
            points: [a, b, c],
            normal,
        })
    }

    /// Signed distance from the face plane, positive on the normal side
    pub fn signed_distance(&self, point: &Vector3) -> f32 {
        let mut offset = Vector3::ZERO;
        offset.subtract_vectors(point, &self.points[0]);
        offset.dot(&self.normal)
    }

    /// Height of the face plane at a horizontal position
    ///
    /// Returns `None` for vertical faces, whose plane has no single height.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let n = &self.normal;
        if n.y.abs() <= f32::EPSILON {
            return None;
        }
        let p = &self.points[0];
        Some(p.y - (n.x * (x - p.x) + n.z * (z - p.z)) / n.y)
    }

    /// Whether `(x, z)` lies inside the face's projection onto the floor plane
    ///
    /// Points on an edge count as inside, so two faces sharing an edge never leave
    /// a gap between them.
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        let [a, b, c] = &self.points;
        let d1 = edge_side(x, z, a, b);
        let d2 = edge_side(x, z, b, c);
        let d3 = edge_side(x, z, c, a);

        let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_negative && has_positive)
    }

    /// Closest point on the triangle to `point`
    pub fn closest_point(&self, point: &Vector3) -> Vector3 {
        let [a, b, c] = &self.points;
        let mut ab = Vector3::ZERO;
        let mut ac = Vector3::ZERO;
        let mut ap = Vector3::ZERO;
        ab.subtract_vectors(b, a);
        ac.subtract_vectors(c, a);
        ap.subtract_vectors(point, a);

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return *a;
        }

        let mut bp = Vector3::ZERO;
        bp.subtract_vectors(point, b);
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return *b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let t = d1 / (d1 - d3);
            return offset(a, &ab, t);
        }

        let mut cp = Vector3::ZERO;
        cp.subtract_vectors(point, c);
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return *c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let t = d2 / (d2 - d6);
            return offset(a, &ac, t);
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            let mut bc = Vector3::ZERO;
            bc.subtract_vectors(c, b);
            return offset(b, &bc, t);
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        let mut closest = offset(a, &ab, v);
        closest.add_scaled(&ac, w);
        closest
    }

    /// Horizontal bounds `(min_x, min_z, max_x, max_z)`
    pub fn xz_bounds(&self) -> (f32, f32, f32, f32) {
        let [a, b, c] = &self.points;
        (
            a.x.min(b.x).min(c.x),
            a.z.min(b.z).min(c.z),
            a.x.max(b.x).max(c.x),
            a.z.max(b.z).max(c.z),
        )
    }

    /// Whether the face's floor-plane projection overlaps the rectangle
    /// `[min_x, max_x] × [min_z, max_z]`
    ///
    /// Touching counts as overlapping. Vertical faces project to a segment and
    /// are tested as one.
    pub fn overlaps_xz_rect(&self, min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> bool {
        let (face_min_x, face_min_z, face_max_x, face_max_z) = self.xz_bounds();
        if face_max_x < min_x || face_min_x > max_x || face_max_z < min_z || face_min_z > max_z {
            return false;
        }

        let corners = [(min_x, min_z), (max_x, min_z), (max_x, max_z), (min_x, max_z)];
        for i in 0..3 {
            let from = &self.points[i];
            let to = &self.points[(i + 1) % 3];
            let (nx, nz) = (to.z - from.z, from.x - to.x);
            if nx == 0.0 && nz == 0.0 {
                continue;
            }

            let face_points = self.points.iter().map(|p| (p.x, p.z));
            let (face_lo, face_hi) = projected_range(face_points, nx, nz);
            let (rect_lo, rect_hi) = projected_range(corners.into_iter(), nx, nz);
            if face_hi < rect_lo || rect_hi < face_lo {
                return false;
            }
        }
        true
    }
}

fn projected_range(points: impl Iterator<Item = (f32, f32)>, nx: f32, nz: f32) -> (f32, f32) {
    points.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (x, z)| {
        let d = x * nx + z * nz;
        (lo.min(d), hi.max(d))
    })
}

fn offset(origin: &Vector3, direction: &Vector3, t: f32) -> Vector3 {
    let mut point = *origin;
    point.add_scaled(direction, t);
    point
}

fn edge_side(x: f32, z: f32, from: &Vector3, to: &Vector3) -> f32 {
    (x - to.x) * (from.z - to.z) - (from.x - to.x) * (z - to.z)
}
