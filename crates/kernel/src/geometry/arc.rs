use serde::{Deserialize, Serialize};

use super::unit_vector::UnitVector3;
use super::GeometryError;

/// The shorter great circle arc between two points on the sphere.
///
/// The rotation axis is the unit normal of the arc's great circle, oriented so
/// that rotating `start` about it by a positive angle moves towards `end`. It
/// is `None` for zero-length arcs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreatCircleArc {
    start: UnitVector3,
    end: UnitVector3,
    rotation_axis: Option<UnitVector3>,
}

impl GreatCircleArc {
    /// Create the arc from `start` to `end`.
    ///
    /// Antipodal endpoints do not define a unique great circle and are rejected.
    pub fn new(start: UnitVector3, end: UnitVector3) -> Result<Self, GeometryError> {
        let tol = crate::default_tolerance();
        let dot = start.dot(&end);
        if tol.is_parallel_dot(dot) {
            return Ok(Self {
                start,
                end,
                rotation_axis: None,
            });
        }
        if tol.is_antiparallel_dot(dot) {
            return Err(GeometryError::AntipodalArcEndpoints);
        }
        let rotation_axis = UnitVector3::from_vec3_normalized(&start.cross(&end))
            .ok_or(GeometryError::AntipodalArcEndpoints)?;
        Ok(Self {
            start,
            end,
            rotation_axis: Some(rotation_axis),
        })
    }

    pub(crate) fn from_parts(
        start: UnitVector3,
        end: UnitVector3,
        rotation_axis: Option<UnitVector3>,
    ) -> Self {
        Self {
            start,
            end,
            rotation_axis,
        }
    }

    pub fn start_point(&self) -> &UnitVector3 {
        &self.start
    }

    pub fn end_point(&self) -> &UnitVector3 {
        &self.end
    }

    pub fn rotation_axis(&self) -> Option<&UnitVector3> {
        self.rotation_axis.as_ref()
    }

    pub fn is_zero_length(&self) -> bool {
        self.rotation_axis.is_none()
    }

    /// Arc length in radians.
    pub fn arc_length(&self) -> f64 {
        self.start.angle_to(&self.end)
    }

    /// Range `(min, max)` of `dot(centre, p)` over every point `p` of the arc.
    ///
    /// The extremes are not always at the endpoints: an arc can bulge towards
    /// or away from `centre` in its interior.
    pub fn dot_product_range(&self, centre: &UnitVector3) -> (f64, f64) {
        let dot_start = centre.dot(&self.start);
        let dot_end = centre.dot(&self.end);
        let mut min_dot = dot_start.min(dot_end);
        let mut max_dot = dot_start.max(dot_end);

        let Some(axis) = self.rotation_axis else {
            return (min_dot, max_dot);
        };

        // Normal of the plane containing `centre` and the arc's rotation axis.
        // That plane cuts the arc's great circle at its nearest and furthest
        // points from `centre`.
        let dividing_normal = axis.cross(centre);
        let proj_len = dividing_normal.length();
        if crate::default_tolerance().is_degenerate_cross(proj_len) {
            // `centre` is a pole of the great circle: every arc point is equidistant.
            return (min_dot, max_dot);
        }

        let side_start = dividing_normal.dot(&self.start.to_vec3());
        let side_end = dividing_normal.dot(&self.end.to_vec3());
        let crosses = (side_start > 0.0 && side_end < 0.0) || (side_start < 0.0 && side_end > 0.0);
        if !crosses {
            return (min_dot, max_dot);
        }

        // The crossing is either the nearest point `q` (dot = proj_len) or its
        // antipode (dot = -proj_len). The arc is shorter than PI, so whichever
        // lies in the hemisphere of the arc midpoint is on the arc.
        let projected = centre.to_vec3() - axis.to_vec3() * centre.dot(&axis);
        let midpoint = self.start.to_vec3() + self.end.to_vec3();
        let extremum_dot = if projected.dot(&midpoint) >= 0.0 {
            proj_len
        } else {
            -proj_len
        };
        min_dot = min_dot.min(extremum_dot);
        max_dot = max_dot.max(extremum_dot);
        (min_dot, max_dot)
    }
}

/// True if arcs `ab` and `cd` cross at a point interior to both.
///
/// All four orientations of the triangles ACB, CBD, BDA and DAC must agree;
/// shared vertices and touching endpoints do not count as crossings.
pub fn arcs_cross(a: &UnitVector3, b: &UnitVector3, c: &UnitVector3, d: &UnitVector3) -> bool {
    let ab = a.cross(b);
    let acb = -ab.dot(&c.to_vec3());
    let bda = ab.dot(&d.to_vec3());
    if acb * bda <= 0.0 {
        return false;
    }

    let cd = c.cross(d);
    let cbd = -cd.dot(&b.to_vec3());
    let dac = cd.dot(&a.to_vec3());

    acb * cbd > 0.0 && acb * dac > 0.0
}
