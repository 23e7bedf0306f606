//! Mutable 3D/4D point type
//!
//! [`Vector3`] is the unit of spatial computation for the physics core. Every
//! arithmetic operation mutates the receiver in place and returns it, so calls
//! can be chained. The `*_vectors` variants write the combination of two other
//! vectors into the receiver without touching either argument, which keeps the
//! per-frame paths free of temporaries.
//!
//! # Example
//! ```
//! use ferryman_physics::Vector3;
//!
//! let mut v = Vector3::new(1.0, 2.0, 3.0);
//! v.add(&Vector3::new(1.0, 0.0, 0.0)).scale(2.0);
//! assert_eq!(v.to_array(), [4.0, 4.0, 6.0]);
//! ```

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch saturation above which the Euler decomposition is gimbal-locked
const GIMBAL_LOCK_THRESHOLD: f32 = 0.999_999_9;

/// Mutable point/direction with an optional homogeneous `w` component
///
/// `w` defaults to 1.0 and is ignored by every operation except [`Vector3::set_w`]
/// and the constructors; `magnitude` and `dot` use `(x, y, z)` only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default = "default_w")]
    pub w: f32,
}

fn default_w() -> f32 {
    1.0
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub const fn with_w(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Texture-space alias for `x`
    pub fn u(&self) -> f32 {
        self.x
    }

    /// Texture-space alias for `y`
    pub fn v(&self) -> f32 {
        self.y
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Copy `x`, `y`, `z` from another vector (`w` is kept)
    pub fn set_from(&mut self, other: &Vector3) -> &mut Self {
        self.set(other.x, other.y, other.z)
    }

    pub fn set_w(&mut self, w: f32) -> &mut Self {
        self.w = w;
        self
    }

    pub fn add(&mut self, other: &Vector3) -> &mut Self {
        let (x, y, z) = (self.x + other.x, self.y + other.y, self.z + other.z);
        self.set(x, y, z)
    }

    /// Store `a + b` in the receiver
    pub fn add_vectors(&mut self, a: &Vector3, b: &Vector3) -> &mut Self {
        self.set(a.x + b.x, a.y + b.y, a.z + b.z)
    }

    pub fn subtract(&mut self, other: &Vector3) -> &mut Self {
        let (x, y, z) = (self.x - other.x, self.y - other.y, self.z - other.z);
        self.set(x, y, z)
    }

    /// Store `a - b` in the receiver
    pub fn subtract_vectors(&mut self, a: &Vector3, b: &Vector3) -> &mut Self {
        self.set(a.x - b.x, a.y - b.y, a.z - b.z)
    }

    pub fn scale(&mut self, factor: f32) -> &mut Self {
        self.x *= factor;
        self.y *= factor;
        self.z *= factor;
        self
    }

    /// Add `other * factor` to the receiver
    pub fn add_scaled(&mut self, other: &Vector3, factor: f32) -> &mut Self {
        self.x += other.x * factor;
        self.y += other.y * factor;
        self.z += other.z * factor;
        self
    }

    pub fn cross(&mut self, other: &Vector3) -> &mut Self {
        let this = *self;
        self.cross_vectors(&this, other)
    }

    /// Store `a × b` in the receiver
    pub fn cross_vectors(&mut self, a: &Vector3, b: &Vector3) -> &mut Self {
        let x = a.y * b.z - a.z * b.y;
        let y = a.z * b.x - a.x * b.z;
        let z = a.x * b.y - a.y * b.x;
        self.set(x, y, z)
    }

    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Move the receiver towards `other` by `alpha` (0 = stay, 1 = arrive)
    pub fn lerp(&mut self, other: &Vector3, alpha: f32) -> &mut Self {
        self.x += (other.x - self.x) * alpha;
        self.y += (other.y - self.y) * alpha;
        self.z += (other.z - self.z) * alpha;
        self
    }

    /// Euclidean norm of `(x, y, z)`
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Scale to unit length
    ///
    /// A zero-length vector is left as the zero vector instead of turning into NaN.
    pub fn normalize(&mut self) -> &mut Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return self.set(0.0, 0.0, 0.0);
        }
        self.scale(1.0 / magnitude)
    }

    /// Unit-length copy; the zero vector for zero-length input
    pub fn normalized(&self) -> Vector3 {
        let mut copy = *self;
        copy.normalize();
        copy
    }

    pub fn distance_to(&self, other: &Vector3) -> f32 {
        let mut delta = Vector3::ZERO;
        delta.subtract_vectors(self, other).magnitude()
    }

    /// Apply `f` to `x`, `y` and `z`
    pub fn modify_components(&mut self, f: impl Fn(f32) -> f32) -> &mut Self {
        self.set(f(self.x), f(self.y), f(self.z))
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Extract XYZ Euler angles (radians) from a rotation matrix
    ///
    /// The matrix is read as `Rx * Ry * Rz`. Near a pitch of ±90° the roll is
    /// folded into `x` and `z` is set to zero.
    pub fn set_from_rotation_matrix(&mut self, matrix: &Mat4) -> &mut Self {
        let m11 = matrix.x_axis.x;
        let m12 = matrix.y_axis.x;
        let m13 = matrix.z_axis.x;
        let m22 = matrix.y_axis.y;
        let m23 = matrix.z_axis.y;
        let m32 = matrix.y_axis.z;
        let m33 = matrix.z_axis.z;

        self.y = m13.clamp(-1.0, 1.0).asin();
        if m13.abs() < GIMBAL_LOCK_THRESHOLD {
            self.x = (-m23).atan2(m33);
            self.z = (-m12).atan2(m11);
        } else {
            self.x = m32.atan2(m22);
            self.z = 0.0;
        }
        self
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}
