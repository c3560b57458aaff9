use std::f64::consts::PI;
use tracing::debug;

use super::{AngularExtent, BoundingSmallCircle};
use crate::geometry::unit_vector::UnitVector3;

/// Smallest cap (up to rounding) covering both `c1` and `c2`.
///
/// If one cap contains the other it is returned unchanged. Otherwise the result
/// is centred on the great circle through both centres, midway between the far
/// edges of the two caps, with radius `(angle + e1 + e2) / 2` clamped to `PI`.
///
/// Antipodal centres have no unique great circle between them; any one will
/// do, so a perpendicular to `c1`'s centre is used as the direction of travel.
pub fn create_optimal_bounding_small_circle(
    c1: &BoundingSmallCircle,
    c2: &BoundingSmallCircle,
) -> BoundingSmallCircle {
    let tol = crate::default_tolerance();
    let cross = c1.centre().cross(c2.centre());
    let cross_len = cross.length();
    let dot = c1.centre().dot(c2.centre());
    // atan2 keeps the separation exact for identical centres, where acos(dot) is not.
    let angle = cross_len.atan2(dot);

    let e1 = c1.extent().angle();
    let e2 = c2.extent().angle();

    if angle + e2 <= e1 {
        debug!(angle, e1, e2, "second cap contained in first");
        return *c1;
    }
    if angle + e1 <= e2 {
        debug!(angle, e1, e2, "first cap contained in second");
        return *c2;
    }

    let direction = if tol.is_degenerate_cross(cross_len) {
        if dot > 0.0 {
            debug!(angle, e1, e2, "coincident centres, keeping larger cap");
            return larger(c1, c2);
        }
        debug!(angle, e1, e2, "antipodal centres, merging along arbitrary great circle");
        c1.centre().generate_perpendicular()
    } else {
        let Some(direction) = UnitVector3::from_vec3_normalized(&cross.cross(&c1.centre().to_vec3())) else {
            return larger(c1, c2);
        };
        direction
    };

    let theta = 0.5 * (angle + e2 - e1);
    let centre_vec = c1.centre().to_vec3() * theta.cos() + direction.to_vec3() * theta.sin();
    let Some(centre) = UnitVector3::from_vec3_normalized(&centre_vec) else {
        return larger(c1, c2);
    };
    let radius = (0.5 * (angle + e1 + e2)).min(PI);
    BoundingSmallCircle::new(centre, AngularExtent::from_angle(radius))
}

fn larger(c1: &BoundingSmallCircle, c2: &BoundingSmallCircle) -> BoundingSmallCircle {
    if c1.extent() >= c2.extent() { *c1 } else { *c2 }
}
