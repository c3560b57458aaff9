use approx::AbsDiffEq;
use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Neg;

use super::vector::Vec3;
use super::GeometryError;

/// A unit-length direction in 3D space, i.e. a point on the unit sphere.
///
/// The fields are private so that every value in circulation is unit length
/// (within [`Tolerance::unit_length`](crate::Tolerance)). Deserialization goes
/// through the same validation as [`UnitVector3::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec3", into = "Vec3")]
pub struct UnitVector3 {
    x: f64,
    y: f64,
    z: f64,
}

impl UnitVector3 {
    pub const X: Self = Self {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };
    pub const Y: Self = Self {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    pub const Z: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    /// Create a unit vector, rejecting components whose magnitude is not one.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, GeometryError> {
        let magnitude = (x * x + y * y + z * z).sqrt();
        if !crate::default_tolerance().is_unit_length(magnitude) {
            return Err(GeometryError::NotUnitLength { x, y, z, magnitude });
        }
        Ok(Self { x, y, z })
    }

    /// Components the caller guarantees are unit length (results of isometries,
    /// normalised vectors, trigonometric combinations of orthonormal vectors).
    pub(crate) fn new_unchecked(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Normalise an arbitrary vector, or `None` if it is (near) zero.
    pub fn from_vec3_normalized(v: &Vec3) -> Option<Self> {
        v.normalized().map(|n| Self::new_unchecked(n.x, n.y, n.z))
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Vec3 {
        self.to_vec3().cross(&other.to_vec3())
    }

    /// Angular distance (radians, `[0, PI]`) between the two points.
    pub fn angle_to(&self, other: &Self) -> f64 {
        self.dot(other).clamp(-1.0, 1.0).acos()
    }

    pub fn is_coincident_with(&self, other: &Self) -> bool {
        crate::default_tolerance().is_parallel_dot(self.dot(other))
    }

    pub fn is_antipodal_to(&self, other: &Self) -> bool {
        crate::default_tolerance().is_antiparallel_dot(self.dot(other))
    }

    /// Some unit vector perpendicular to `self`.
    ///
    /// Crosses with the coordinate axis along which `self` has its smallest
    /// component, which keeps the cross product well away from zero length.
    pub fn generate_perpendicular(&self) -> Self {
        let (ax, ay, az) = (self.x.abs(), self.y.abs(), self.z.abs());
        let helper = if ax <= ay && ax <= az {
            Vec3::new(1.0, 0.0, 0.0)
        } else if ay <= az {
            Vec3::new(0.0, 1.0, 0.0)
        } else {
            Vec3::new(0.0, 0.0, 1.0)
        };
        let c = self.to_vec3().cross(&helper);
        // |c| >= sqrt(2/3) because the smallest component is at most 1/sqrt(3).
        let len = c.length();
        Self::new_unchecked(c.x / len, c.y / len, c.z / len)
    }

    pub(crate) fn to_nalgebra_unit(self) -> Unit<Vector3<f64>> {
        Unit::new_unchecked(Vector3::new(self.x, self.y, self.z))
    }
}

impl Neg for UnitVector3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new_unchecked(-self.x, -self.y, -self.z)
    }
}

impl TryFrom<Vec3> for UnitVector3 {
    type Error = GeometryError;

    fn try_from(v: Vec3) -> Result<Self, Self::Error> {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<UnitVector3> for Vec3 {
    fn from(u: UnitVector3) -> Self {
        u.to_vec3()
    }
}

impl AbsDiffEq for UnitVector3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_vec3().abs_diff_eq(&other.to_vec3(), epsilon)
    }
}
