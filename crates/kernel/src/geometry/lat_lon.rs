use serde::{Deserialize, Serialize};

use super::unit_vector::UnitVector3;
use super::GeometryError;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonPoint {
    latitude: f64,
    longitude: f64,
}

impl LatLonPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeometryError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeometryError::InvalidLatitude(latitude));
        }
        if !(-360.0..=360.0).contains(&longitude) {
            return Err(GeometryError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn to_unit_vector(&self) -> UnitVector3 {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        UnitVector3::new_unchecked(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Longitude is in `(-180, 180]`; at the poles it is reported as zero.
    pub fn from_unit_vector(u: &UnitVector3) -> Self {
        let latitude = u.z().clamp(-1.0, 1.0).asin().to_degrees();
        let longitude = if u.x().abs() < 1e-15 && u.y().abs() < 1e-15 {
            0.0
        } else {
            u.y().atan2(u.x()).to_degrees()
        };
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<&UnitVector3> for LatLonPoint {
    fn from(u: &UnitVector3) -> Self {
        Self::from_unit_vector(u)
    }
}
