use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// An angle in `[0, PI]` stored as its cosine and sine.
///
/// Bounding tests compare dot products against cosines directly, and sums and
/// differences of extents use the angle-addition identities, so no inverse
/// trigonometry is needed until [`AngularExtent::angle`] is asked for.
///
/// Ordering follows the angle: a larger extent has a smaller cosine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularExtent {
    cosine: f64,
    sine: f64,
}

impl AngularExtent {
    pub const ZERO: Self = Self {
        cosine: 1.0,
        sine: 0.0,
    };
    pub const HALF_PI: Self = Self {
        cosine: 0.0,
        sine: 1.0,
    };
    pub const PI: Self = Self {
        cosine: -1.0,
        sine: 0.0,
    };

    /// Extent whose cosine is `cosine` (clamped to `[-1, 1]`).
    pub fn from_cosine(cosine: f64) -> Self {
        let cosine = cosine.clamp(-1.0, 1.0);
        Self {
            cosine,
            sine: (1.0 - cosine * cosine).max(0.0).sqrt(),
        }
    }

    /// Extent of `angle` radians (clamped to `[0, PI]`).
    pub fn from_angle(angle: f64) -> Self {
        let angle = angle.clamp(0.0, std::f64::consts::PI);
        Self {
            cosine: angle.cos(),
            sine: angle.sin(),
        }
    }

    fn from_cosine_and_sine(cosine: f64, sine: f64) -> Self {
        Self {
            cosine: cosine.clamp(-1.0, 1.0),
            sine: sine.clamp(0.0, 1.0),
        }
    }

    pub fn cosine(&self) -> f64 {
        self.cosine
    }

    pub fn sine(&self) -> f64 {
        self.sine
    }

    /// The angle in radians.
    pub fn angle(&self) -> f64 {
        self.sine.atan2(self.cosine)
    }
}

/// `a + b`, saturating at `PI`.
impl Add for AngularExtent {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        // a + b > PI  <=>  a > PI - b  <=>  cos(a) < -cos(b)
        if self.cosine < -rhs.cosine {
            return Self::PI;
        }
        Self::from_cosine_and_sine(
            self.cosine * rhs.cosine - self.sine * rhs.sine,
            self.sine * rhs.cosine + self.cosine * rhs.sine,
        )
    }
}

/// `a - b`, saturating at zero.
impl Sub for AngularExtent {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        if self.cosine >= rhs.cosine {
            return Self::ZERO;
        }
        Self::from_cosine_and_sine(
            self.cosine * rhs.cosine + self.sine * rhs.sine,
            self.sine * rhs.cosine - self.cosine * rhs.sine,
        )
    }
}

impl PartialOrd for AngularExtent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.cosine.partial_cmp(&self.cosine)
    }
}
