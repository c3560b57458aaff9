use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::arc::GreatCircleArc;
use super::lat_lon::LatLonPoint;
use super::shapes::{GeometryOnSphere, MultiPointOnSphere, PolygonOnSphere, PolylineOnSphere};
use super::small_circle::{SmallCircle, SmallCircleArc};
use super::unit_vector::UnitVector3;
use super::vector::Vec3;
use super::GeometryError;

/// A rotation of the unit sphere about an axis through the origin.
///
/// Follows the right-hand rule: a positive angle turns points anticlockwise
/// when viewed from the tip of the axis looking back towards the origin.
///
/// Backed by a unit quaternion `(s, v)`. The coefficients `d = s^2 - |v|^2`
/// and `e = 2*s*v` are cached at construction so that a vector `w` rotates as
/// `d*w + 2*(v.w)*v + e x w` without building a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "AxisAngle", into = "AxisAngle")]
pub struct Rotation {
    axis: UnitVector3,
    angle: f64,
    quaternion: UnitQuaternion<f64>,
    d: f64,
    e: Vec3,
}

/// Serialized form of a [`Rotation`]; the quaternion terms are re-derived on load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct AxisAngle {
    axis: UnitVector3,
    angle: f64,
}

impl From<AxisAngle> for Rotation {
    fn from(aa: AxisAngle) -> Self {
        Rotation::create(aa.axis, aa.angle)
    }
}

impl From<Rotation> for AxisAngle {
    fn from(r: Rotation) -> Self {
        AxisAngle {
            axis: r.axis,
            angle: r.angle,
        }
    }
}

/// Judged on the vector part, `|v| = sin(angle / 2)`, which stays resolvable
/// for small angles where the scalar part has already rounded to one.
fn is_identity_quaternion(q: &UnitQuaternion<f64>) -> bool {
    crate::default_tolerance().is_degenerate_cross(Vec3::from(q.imag()).length())
}

impl Rotation {
    /// Rotation by `angle` radians about `axis`.
    pub fn create(axis: UnitVector3, angle: f64) -> Self {
        let quaternion = UnitQuaternion::from_axis_angle(&axis.to_nalgebra_unit(), angle);
        Self::from_parts(axis, angle, quaternion)
    }

    /// The identity rotation, reported with `axis` as its (arbitrary) axis.
    pub fn identity(axis: UnitVector3) -> Self {
        Self::create(axis, 0.0)
    }

    /// The rotation taking `initial` onto `target` along the great circle through both.
    ///
    /// Coincident points give the identity (axis `initial`); antipodal points
    /// give a half turn about some axis perpendicular to `initial`.
    pub fn create_from_points(initial: &UnitVector3, target: &UnitVector3) -> Self {
        let tol = crate::default_tolerance();
        let dot = initial.dot(target);
        if tol.is_parallel_dot(dot) {
            return Self::identity(*initial);
        }
        if tol.is_antiparallel_dot(dot) {
            return Self::create(initial.generate_perpendicular(), std::f64::consts::PI);
        }
        match UnitVector3::from_vec3_normalized(&initial.cross(target)) {
            Some(axis) => Self::create(axis, dot.clamp(-1.0, 1.0).acos()),
            // Unreachable in practice: a zero cross product means (anti)parallel.
            None => Self::identity(*initial),
        }
    }

    /// Rotation about the pole at `pole` by `angle_degrees` (a finite rotation / Euler pole).
    pub fn from_euler_pole(pole: &LatLonPoint, angle_degrees: f64) -> Self {
        Self::create(pole.to_unit_vector(), angle_degrees.to_radians())
    }

    /// Spherical linear interpolation from `from` (`t = 0`) to `to` (`t = 1`),
    /// taking the shorter path between the two orientations.
    pub fn interpolate(from: &Rotation, to: &Rotation, t: f64) -> Result<Self, GeometryError> {
        let tol = crate::default_tolerance();
        let q = from
            .quaternion
            .try_slerp(&to.quaternion, t, tol.dot_product)
            .ok_or(GeometryError::InterpolationUndefined)?;
        Ok(Self::from_quaternion(q, from.axis))
    }

    fn from_parts(axis: UnitVector3, angle: f64, quaternion: UnitQuaternion<f64>) -> Self {
        let s = quaternion.scalar();
        let v = Vec3::from(quaternion.imag());
        Self {
            axis,
            angle,
            quaternion,
            d: s * s - v.length_squared(),
            e: v * (2.0 * s),
        }
    }

    /// Wrap a computed quaternion, extracting its axis and angle. A quaternion
    /// that is (within tolerance) the identity has no well-defined axis, so it
    /// becomes the identity about `fallback_axis`.
    fn from_quaternion(quaternion: UnitQuaternion<f64>, fallback_axis: UnitVector3) -> Self {
        if is_identity_quaternion(&quaternion) {
            return Self::identity(fallback_axis);
        }
        let s = quaternion.scalar();
        let v = Vec3::from(quaternion.imag());
        // q and -q are the same rotation; pick the sign with s >= 0 so the angle is in [0, PI].
        let v = if s < 0.0 { -v } else { v };
        let Some(axis) = UnitVector3::from_vec3_normalized(&v) else {
            return Self::identity(fallback_axis);
        };
        // atan2 keeps small angles exact where acos(s) would round to zero.
        let angle = 2.0 * v.length().atan2(s.abs());
        Self::from_parts(axis, angle, quaternion)
    }

    pub fn axis(&self) -> &UnitVector3 {
        &self.axis
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn quaternion(&self) -> &UnitQuaternion<f64> {
        &self.quaternion
    }

    pub fn is_identity(&self) -> bool {
        is_identity_quaternion(&self.quaternion)
    }

    /// The inverse rotation: same axis, negated angle.
    pub fn get_reverse(&self) -> Self {
        Self::from_parts(self.axis, -self.angle, self.quaternion.inverse())
    }

    /// Apply the rotation to a point on the sphere.
    pub fn rotate(&self, w: &UnitVector3) -> UnitVector3 {
        let v = Vec3::from(self.quaternion.imag());
        let w = w.to_vec3();
        let r = w * self.d + v * (2.0 * v.dot(&w)) + self.e.cross(&w);
        UnitVector3::new_unchecked(r.x, r.y, r.z)
    }

    pub fn rotate_arc(&self, arc: &GreatCircleArc) -> GreatCircleArc {
        GreatCircleArc::from_parts(
            self.rotate(arc.start_point()),
            self.rotate(arc.end_point()),
            arc.rotation_axis().map(|axis| self.rotate(axis)),
        )
    }

    pub fn rotate_multi_point(&self, multi_point: &MultiPointOnSphere) -> MultiPointOnSphere {
        MultiPointOnSphere::from_parts(
            multi_point.points().iter().map(|p| self.rotate(p)).collect(),
            self.rotate(multi_point.centroid()),
        )
    }

    pub fn rotate_polyline(&self, polyline: &PolylineOnSphere) -> PolylineOnSphere {
        PolylineOnSphere::from_parts(
            polyline.vertices().iter().map(|p| self.rotate(p)).collect(),
            polyline.arcs().iter().map(|a| self.rotate_arc(a)).collect(),
            self.rotate(polyline.centroid()),
        )
    }

    pub fn rotate_polygon(&self, polygon: &PolygonOnSphere) -> PolygonOnSphere {
        PolygonOnSphere::from_parts(
            polygon.vertices().iter().map(|p| self.rotate(p)).collect(),
            polygon.arcs().iter().map(|a| self.rotate_arc(a)).collect(),
            self.rotate(polygon.centroid()),
        )
    }

    /// Rotate any geometry, producing the same variant with rotated points.
    pub fn rotate_geometry(&self, geometry: &GeometryOnSphere) -> GeometryOnSphere {
        match geometry {
            GeometryOnSphere::Point(p) => GeometryOnSphere::Point(self.rotate(p)),
            GeometryOnSphere::MultiPoint(m) => GeometryOnSphere::MultiPoint(self.rotate_multi_point(m)),
            GeometryOnSphere::Polyline(l) => GeometryOnSphere::Polyline(self.rotate_polyline(l)),
            GeometryOnSphere::Polygon(p) => GeometryOnSphere::Polygon(self.rotate_polygon(p)),
        }
    }
}

// ─── Operator forms ─────────────────────────────────────────────────────────

/// Composition: `(r1 * r2) * v == r1 * (r2 * v)`.
impl Mul<Rotation> for Rotation {
    type Output = Rotation;
    fn mul(self, rhs: Rotation) -> Self::Output {
        Rotation::from_quaternion(self.quaternion * rhs.quaternion, self.axis)
    }
}

impl Mul<&Rotation> for &Rotation {
    type Output = Rotation;
    fn mul(self, rhs: &Rotation) -> Self::Output {
        *self * *rhs
    }
}

impl Mul<UnitVector3> for Rotation {
    type Output = UnitVector3;
    fn mul(self, rhs: UnitVector3) -> Self::Output {
        self.rotate(&rhs)
    }
}

impl Mul<&UnitVector3> for &Rotation {
    type Output = UnitVector3;
    fn mul(self, rhs: &UnitVector3) -> Self::Output {
        self.rotate(rhs)
    }
}

impl Mul<&GreatCircleArc> for &Rotation {
    type Output = GreatCircleArc;
    fn mul(self, rhs: &GreatCircleArc) -> Self::Output {
        self.rotate_arc(rhs)
    }
}

impl Mul<&SmallCircle> for &Rotation {
    type Output = SmallCircle;
    fn mul(self, rhs: &SmallCircle) -> Self::Output {
        SmallCircle::new(self.rotate(rhs.centre()), rhs.colatitude())
    }
}

impl Mul<&SmallCircleArc> for &Rotation {
    type Output = SmallCircleArc;
    fn mul(self, rhs: &SmallCircleArc) -> Self::Output {
        SmallCircleArc::from_parts(
            self.rotate(rhs.centre()),
            self.rotate(rhs.start_point()),
            rhs.angular_extent(),
        )
    }
}

impl Mul<&MultiPointOnSphere> for &Rotation {
    type Output = MultiPointOnSphere;
    fn mul(self, rhs: &MultiPointOnSphere) -> Self::Output {
        self.rotate_multi_point(rhs)
    }
}

impl Mul<&PolylineOnSphere> for &Rotation {
    type Output = PolylineOnSphere;
    fn mul(self, rhs: &PolylineOnSphere) -> Self::Output {
        self.rotate_polyline(rhs)
    }
}

impl Mul<&PolygonOnSphere> for &Rotation {
    type Output = PolygonOnSphere;
    fn mul(self, rhs: &PolygonOnSphere) -> Self::Output {
        self.rotate_polygon(rhs)
    }
}

impl Mul<&GeometryOnSphere> for &Rotation {
    type Output = GeometryOnSphere;
    fn mul(self, rhs: &GeometryOnSphere) -> Self::Output {
        self.rotate_geometry(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-9;

    fn ll(lat: f64, lon: f64) -> UnitVector3 {
        LatLonPoint::new(lat, lon).unwrap().to_unit_vector()
    }

    #[test]
    fn test_right_hand_rule() {
        let r = Rotation::create(UnitVector3::X, FRAC_PI_2);
        let rotated = r * UnitVector3::Z;
        assert_abs_diff_eq!(rotated, UnitVector3::new(0.0, -1.0, 0.0).unwrap(), epsilon = TOL);

        let r = Rotation::create(UnitVector3::Z, FRAC_PI_2);
        assert_abs_diff_eq!(r * UnitVector3::X, UnitVector3::Y, epsilon = TOL);
    }

    #[test]
    fn test_cached_terms() {
        let r = Rotation::create(UnitVector3::X, FRAC_PI_2);
        // s = cos(pi/4), v = sin(pi/4) * x
        assert!(r.d.abs() < 1e-12);
        assert_abs_diff_eq!(r.e, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_create_from_points_general() {
        let a = ll(10.0, 20.0);
        let b = ll(-35.0, 140.0);
        let r = Rotation::create_from_points(&a, &b);
        assert_abs_diff_eq!(r * a, b, epsilon = TOL);
        assert!((r.angle() - a.angle_to(&b)).abs() < 1e-12);
    }

    #[test]
    fn test_create_from_points_coincident() {
        let a = ll(10.0, 20.0);
        let r = Rotation::create_from_points(&a, &a);
        assert!(r.is_identity());
        assert_eq!(r.axis(), &a);
        assert_eq!(r.angle(), 0.0);
        assert_abs_diff_eq!(r * a, a, epsilon = TOL);
    }

    #[test]
    fn test_create_from_points_antipodal() {
        let a = ll(10.0, 20.0);
        let r = Rotation::create_from_points(&a, &(-a));
        assert!((r.angle() - PI).abs() < 1e-12);
        assert!(r.axis().dot(&a).abs() < 1e-12);
        assert_abs_diff_eq!(r * a, -a, epsilon = TOL);
    }

    #[test]
    fn test_reverse_undoes_rotation() {
        let r = Rotation::create(ll(45.0, -30.0), 1.234);
        let v = ll(-12.0, 77.0);
        let back = r.get_reverse() * (r * v);
        assert_abs_diff_eq!(back, v, epsilon = TOL);
        assert_eq!(r.get_reverse().axis(), r.axis());
        assert_eq!(r.get_reverse().angle(), -1.234);
    }

    #[test]
    fn test_composition_applies_right_first() {
        let r1 = Rotation::create(UnitVector3::Z, FRAC_PI_2);
        let r2 = Rotation::create(UnitVector3::X, FRAC_PI_2);
        let v = UnitVector3::Z;
        // r2 takes z to -y, r1 takes -y to x.
        assert_abs_diff_eq!((r1 * r2) * v, UnitVector3::X, epsilon = TOL);
        assert_abs_diff_eq!((r1 * r2) * v, r1 * (r2 * v), epsilon = TOL);
    }

    #[test]
    fn test_composition_with_reverse_is_identity() {
        let r = Rotation::create(ll(20.0, 50.0), 0.7);
        let id = r * r.get_reverse();
        assert!(id.is_identity());
        assert_eq!(id.axis(), r.axis());
        assert_eq!(id.angle(), 0.0);
    }

    #[test]
    fn test_small_rotation_is_not_identity() {
        for angle in [1e-6, 1e-9] {
            let r = Rotation::create(UnitVector3::Z, angle);
            assert!(!r.is_identity(), "angle {angle}");
        }
    }

    #[test]
    fn test_composition_keeps_tiny_net_rotation() {
        for angle in [1e-6, 1e-9] {
            let r1 = Rotation::create(UnitVector3::Z, angle);
            let r2 = Rotation::identity(UnitVector3::Z);
            let composed = r1 * r2;
            assert_abs_diff_eq!(composed * UnitVector3::X, r1 * (r2 * UnitVector3::X), epsilon = 1e-13);
            assert!((composed.angle() - angle).abs() < 1e-15, "angle {angle}");
            assert_abs_diff_eq!(*composed.axis(), UnitVector3::Z, epsilon = 1e-12);

            // Near-cancelling pair leaving a small residual about X.
            let a = Rotation::create(UnitVector3::X, 0.8 + angle);
            let b = Rotation::create(UnitVector3::X, 0.8).get_reverse();
            let residual = a * b;
            let v = UnitVector3::Z;
            assert_abs_diff_eq!(residual * v, a * (b * v), epsilon = 1e-12);
            assert!(!residual.is_identity(), "angle {angle}");
        }
    }

    #[test]
    fn test_euler_pole() {
        let pole = LatLonPoint::new(90.0, 0.0).unwrap();
        let r = Rotation::from_euler_pole(&pole, 90.0);
        let moved = LatLonPoint::from_unit_vector(&(r * ll(0.0, 0.0)));
        assert!((moved.longitude() - 90.0).abs() < 1e-9);
        assert!(moved.latitude().abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_halfway() {
        let r0 = Rotation::identity(UnitVector3::Z);
        let r1 = Rotation::create(UnitVector3::Z, FRAC_PI_2);
        let half = Rotation::interpolate(&r0, &r1, 0.5).unwrap();
        assert!((half.angle() - FRAC_PI_2 / 2.0).abs() < 1e-9);
        assert_abs_diff_eq!(*half.axis(), UnitVector3::Z, epsilon = 1e-9);

        let start = Rotation::interpolate(&r0, &r1, 0.0).unwrap();
        assert!(start.is_identity());
    }

    #[test]
    fn test_rotate_geometry_preserves_variant() {
        let r = Rotation::create(UnitVector3::Z, FRAC_PI_2);
        let line = PolylineOnSphere::new(vec![ll(0.0, 0.0), ll(0.0, 30.0)]).unwrap();
        let rotated = &r * &GeometryOnSphere::from(line);
        match rotated {
            GeometryOnSphere::Polyline(l) => {
                assert_abs_diff_eq!(l.vertices()[0], ll(0.0, 90.0), epsilon = TOL);
                assert_abs_diff_eq!(l.vertices()[1], ll(0.0, 120.0), epsilon = TOL);
                assert_abs_diff_eq!(*l.arcs()[0].rotation_axis().unwrap(), UnitVector3::Z, epsilon = TOL);
                assert_abs_diff_eq!(*l.centroid(), ll(0.0, 105.0), epsilon = TOL);
            }
            other => panic!("expected polyline, got {other:?}"),
        }

        let point = &r * &GeometryOnSphere::Point(UnitVector3::X);
        assert!(matches!(point, GeometryOnSphere::Point(_)));
    }

    #[test]
    fn test_rotate_small_circle_arc() {
        let r = Rotation::create(UnitVector3::X, FRAC_PI_2);
        let arc = SmallCircleArc::new(UnitVector3::Z, UnitVector3::X, 1.0).unwrap();
        let rotated = &r * &arc;
        assert_abs_diff_eq!(*rotated.centre(), -UnitVector3::Y, epsilon = TOL);
        assert_eq!(rotated.angular_extent(), 1.0);
    }

    #[test]
    fn test_serde_rederives_quaternion() {
        let r = Rotation::create(ll(30.0, 60.0), 0.4);
        let json = serde_json::to_string(&r).unwrap();
        let back: Rotation = serde_json::from_str(&json).unwrap();
        let v = ll(5.0, 5.0);
        assert_abs_diff_eq!(back * v, r * v, epsilon = 1e-12);
    }
}
