use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use super::rotation::Rotation;
use super::unit_vector::UnitVector3;
use super::GeometryError;

/// The circle of points at a constant angular distance (colatitude) from `centre`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmallCircle {
    centre: UnitVector3,
    colatitude: f64,
}

impl SmallCircle {
    /// `colatitude` is clamped to `[0, PI]`.
    pub fn new(centre: UnitVector3, colatitude: f64) -> Self {
        Self {
            centre,
            colatitude: colatitude.clamp(0.0, PI),
        }
    }

    /// The small circle about `centre` passing through `point`.
    pub fn through_point(centre: UnitVector3, point: &UnitVector3) -> Self {
        Self::new(centre, centre.angle_to(point))
    }

    pub fn centre(&self) -> &UnitVector3 {
        &self.centre
    }

    pub fn colatitude(&self) -> f64 {
        self.colatitude
    }

    pub fn cos_colatitude(&self) -> f64 {
        self.colatitude.cos()
    }

    /// True if `point` lies on or within the small circle.
    pub fn contains_point(&self, point: &UnitVector3) -> bool {
        self.centre.dot(point) >= self.cos_colatitude()
    }

    /// Circumference on the unit sphere.
    pub fn length(&self) -> f64 {
        TAU * self.colatitude.sin()
    }
}

/// A portion of a small circle swept anticlockwise (about `centre`) from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmallCircleArc {
    centre: UnitVector3,
    start: UnitVector3,
    angular_extent: f64,
}

impl SmallCircleArc {
    /// Create the arc. `angular_extent` must lie within `[0, 2*PI]`; anything
    /// else is a caller bug and is reported as a violated invariant.
    pub fn new(
        centre: UnitVector3,
        start: UnitVector3,
        angular_extent: f64,
    ) -> Result<Self, GeometryError> {
        debug_assert!(
            (0.0..=TAU).contains(&angular_extent),
            "small circle arc angular extent {angular_extent} outside [0, 2*PI]"
        );
        if !(0.0..=TAU).contains(&angular_extent) {
            return Err(GeometryError::ViolatedInvariant(format!(
                "small circle arc angular extent {angular_extent} outside [0, 2*PI]"
            )));
        }
        Ok(Self {
            centre,
            start,
            angular_extent,
        })
    }

    pub(crate) fn from_parts(centre: UnitVector3, start: UnitVector3, angular_extent: f64) -> Self {
        Self {
            centre,
            start,
            angular_extent,
        }
    }

    pub fn centre(&self) -> &UnitVector3 {
        &self.centre
    }

    pub fn start_point(&self) -> &UnitVector3 {
        &self.start
    }

    pub fn angular_extent(&self) -> f64 {
        self.angular_extent
    }

    pub fn small_circle(&self) -> SmallCircle {
        SmallCircle::through_point(self.centre, &self.start)
    }

    pub fn end_point(&self) -> UnitVector3 {
        Rotation::create(self.centre, self.angular_extent) * self.start
    }

    /// Arc length on the unit sphere.
    pub fn length(&self) -> f64 {
        self.angular_extent * self.centre.angle_to(&self.start).sin()
    }
}
