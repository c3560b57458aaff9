pub mod vector;
pub mod unit_vector;
pub mod lat_lon;
pub mod arc;
pub mod small_circle;
pub mod shapes;
pub mod rotation;

use thiserror::Error;

pub use arc::GreatCircleArc;
pub use lat_lon::LatLonPoint;
pub use shapes::{GeometryOnSphere, MultiPointOnSphere, PolygonOnSphere, PolylineOnSphere};
pub use small_circle::{SmallCircle, SmallCircleArc};

/// Failures raised by the validating constructors of the geometry types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("vector ({x}, {y}, {z}) is not unit length (magnitude {magnitude})")]
    NotUnitLength { x: f64, y: f64, z: f64, magnitude: f64 },

    #[error("latitude {0} is outside [-90, 90] degrees")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-360, 360] degrees")]
    InvalidLongitude(f64),

    #[error("great circle arc endpoints are antipodal, rotation axis is indeterminate")]
    AntipodalArcEndpoints,

    #[error("{kind} requires at least {required} points, got {actual}")]
    InsufficientPoints {
        kind: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("violated invariant: {0}")]
    ViolatedInvariant(String),

    #[error("interpolation between rotations is undefined")]
    InterpolationUndefined,
}
