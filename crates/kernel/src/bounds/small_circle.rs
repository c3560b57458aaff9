use serde::{Deserialize, Serialize};
use std::ops::Mul;
use tracing::warn;

use super::{AngularExtent, SmallCircleResult};
use crate::geometry::arc::GreatCircleArc;
use crate::geometry::rotation::Rotation;
use crate::geometry::shapes::{GeometryOnSphere, MultiPointOnSphere, PolygonOnSphere, PolylineOnSphere};
use crate::geometry::unit_vector::UnitVector3;

/// A spherical cap: every point within `extent` (angular radius) of `centre`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSmallCircle {
    centre: UnitVector3,
    extent: AngularExtent,
}

impl BoundingSmallCircle {
    pub fn new(centre: UnitVector3, extent: AngularExtent) -> Self {
        Self { centre, extent }
    }

    pub fn centre(&self) -> &UnitVector3 {
        &self.centre
    }

    pub fn extent(&self) -> AngularExtent {
        self.extent
    }

    /// Same extent about a new centre.
    pub fn with_centre(&self, centre: UnitVector3) -> Self {
        Self {
            centre,
            extent: self.extent,
        }
    }

    /// Points on the boundary, to within the dot-product tolerance, are inside.
    pub fn test_point(&self, point: &UnitVector3) -> SmallCircleResult {
        if self.centre.dot(point) >= self.inside_cosine() {
            SmallCircleResult::Inside
        } else {
            SmallCircleResult::Outside
        }
    }

    pub fn test_arc(&self, arc: &GreatCircleArc) -> SmallCircleResult {
        let (min_dot, max_dot) = arc.dot_product_range(&self.centre);
        self.classify_dot_range(min_dot, max_dot)
    }

    /// Decides from the first point which way to scan, then stops at the first
    /// point on the other side of the boundary.
    pub fn test_multi_point(&self, multi_point: &MultiPointOnSphere) -> SmallCircleResult {
        let cosine = self.inside_cosine();
        let mut points = multi_point.points().iter();
        let Some(first) = points.next() else {
            return SmallCircleResult::Outside;
        };
        if self.centre.dot(first) < cosine {
            if points.any(|p| self.centre.dot(p) >= cosine) {
                SmallCircleResult::Intersecting
            } else {
                SmallCircleResult::Outside
            }
        } else if points.any(|p| self.centre.dot(p) < cosine) {
            SmallCircleResult::Intersecting
        } else {
            SmallCircleResult::Inside
        }
    }

    pub fn test_polyline(&self, polyline: &PolylineOnSphere) -> SmallCircleResult {
        self.test_arcs(polyline.arcs())
    }

    /// Tests the polygon outline only; see [`Self::test_filled_polygon`].
    pub fn test_polygon(&self, polygon: &PolygonOnSphere) -> SmallCircleResult {
        self.test_arcs(polygon.arcs())
    }

    /// Like [`Self::test_polygon`], but a polygon whose interior encloses the
    /// whole cap counts as intersecting.
    pub fn test_filled_polygon(&self, polygon: &PolygonOnSphere) -> SmallCircleResult {
        match self.test_polygon(polygon) {
            SmallCircleResult::Outside if polygon.is_point_in_polygon(&self.centre) => {
                SmallCircleResult::Intersecting
            }
            result => result,
        }
    }

    /// Classify another cap against this one.
    pub fn test_bounding_small_circle(&self, other: &BoundingSmallCircle) -> SmallCircleResult {
        let separation = AngularExtent::from_cosine(self.centre.dot(&other.centre));
        if separation > self.extent + other.extent {
            SmallCircleResult::Outside
        } else if separation + other.extent <= self.extent {
            SmallCircleResult::Inside
        } else {
            SmallCircleResult::Intersecting
        }
    }

    /// Polygons are tested as filled regions.
    pub fn test_geometry(&self, geometry: &GeometryOnSphere) -> SmallCircleResult {
        match geometry {
            GeometryOnSphere::Point(p) => self.test_point(p),
            GeometryOnSphere::MultiPoint(m) => self.test_multi_point(m),
            GeometryOnSphere::Polyline(l) => self.test_polyline(l),
            GeometryOnSphere::Polygon(p) => self.test_filled_polygon(p),
        }
    }

    fn test_arcs(&self, arcs: &[GreatCircleArc]) -> SmallCircleResult {
        let cosine = self.inside_cosine();
        let mut min_dot = f64::INFINITY;
        let mut max_dot = f64::NEG_INFINITY;
        for arc in arcs {
            let (lo, hi) = arc.dot_product_range(&self.centre);
            min_dot = min_dot.min(lo);
            max_dot = max_dot.max(hi);
            if min_dot < cosine && max_dot >= cosine {
                return SmallCircleResult::Intersecting;
            }
        }
        self.classify_dot_range(min_dot, max_dot)
    }

    /// Dot products at or above this are inside. Every point test goes through it.
    fn inside_cosine(&self) -> f64 {
        self.extent.cosine() - crate::default_tolerance().dot_product
    }

    fn classify_dot_range(&self, min_dot: f64, max_dot: f64) -> SmallCircleResult {
        let cosine = self.inside_cosine();
        if max_dot < cosine {
            SmallCircleResult::Outside
        } else if min_dot >= cosine {
            SmallCircleResult::Inside
        } else {
            SmallCircleResult::Intersecting
        }
    }
}

/// Rotations are isometries, so only the centre moves.
impl Mul<&BoundingSmallCircle> for &Rotation {
    type Output = BoundingSmallCircle;
    fn mul(self, rhs: &BoundingSmallCircle) -> Self::Output {
        rhs.with_centre(self.rotate(rhs.centre()))
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Accumulates the smallest cap about a fixed centre covering everything added.
///
/// Tracks the minimum dot product between the centre and any added point.
#[derive(Debug, Clone)]
pub struct BoundingSmallCircleBuilder {
    centre: UnitVector3,
    min_dot: f64,
    num_added: usize,
}

impl BoundingSmallCircleBuilder {
    pub fn new(centre: UnitVector3) -> Self {
        Self {
            centre,
            min_dot: 1.0,
            num_added: 0,
        }
    }

    pub fn centre(&self) -> &UnitVector3 {
        &self.centre
    }

    pub fn add_point(&mut self, point: &UnitVector3) {
        self.fold_min_dot(point.dot(&self.centre));
    }

    pub fn add_multi_point(&mut self, multi_point: &MultiPointOnSphere) {
        for p in multi_point.points() {
            self.add_point(p);
        }
    }

    /// Accounts for the arc's interior, not just its endpoints.
    pub fn add_arc(&mut self, arc: &GreatCircleArc) {
        let (min_dot, _) = arc.dot_product_range(&self.centre);
        self.fold_min_dot(min_dot);
    }

    pub fn add_polyline(&mut self, polyline: &PolylineOnSphere) {
        for arc in polyline.arcs() {
            self.add_arc(arc);
        }
    }

    pub fn add_polygon(&mut self, polygon: &PolygonOnSphere) {
        for arc in polygon.arcs() {
            self.add_arc(arc);
        }
    }

    pub fn add_geometry(&mut self, geometry: &GeometryOnSphere) {
        match geometry {
            GeometryOnSphere::Point(p) => self.add_point(p),
            GeometryOnSphere::MultiPoint(m) => self.add_multi_point(m),
            GeometryOnSphere::Polyline(l) => self.add_polyline(l),
            GeometryOnSphere::Polygon(p) => self.add_polygon(p),
        }
    }

    /// The furthest point of `other` from our centre is `angle(centres) + other.extent` away.
    pub fn add_bounding_small_circle(&mut self, other: &BoundingSmallCircle) {
        let furthest = AngularExtent::from_cosine(self.centre.dot(other.centre())) + other.extent();
        self.fold_min_dot(furthest.cosine());
    }

    /// Finish the bound. `epsilon` is subtracted from the minimum dot product
    /// (clamped to -1) so round-off cannot push added points outside.
    ///
    /// If nothing was added the result is a zero-extent cap at the centre.
    pub fn get_bounding_small_circle(&self, epsilon: f64) -> BoundingSmallCircle {
        if self.num_added == 0 {
            warn!(centre = ?self.centre, "no primitives added to bounding small circle builder");
            return BoundingSmallCircle::new(self.centre, AngularExtent::ZERO);
        }
        let cosine = (self.min_dot - epsilon).max(-1.0);
        BoundingSmallCircle::new(self.centre, AngularExtent::from_cosine(cosine))
    }

    fn fold_min_dot(&mut self, dot: f64) {
        self.num_added += 1;
        if dot < self.min_dot {
            self.min_dot = dot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::lat_lon::LatLonPoint;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn ll(lat: f64, lon: f64) -> UnitVector3 {
        LatLonPoint::new(lat, lon).unwrap().to_unit_vector()
    }

    fn cap(lat: f64, lon: f64, degrees: f64) -> BoundingSmallCircle {
        BoundingSmallCircle::new(ll(lat, lon), AngularExtent::from_angle(degrees.to_radians()))
    }

    #[test]
    fn test_zero_extent_cap() {
        let c = BoundingSmallCircle::new(UnitVector3::Z, AngularExtent::ZERO);
        assert_eq!(c.test_point(&UnitVector3::Z), SmallCircleResult::Inside);
        assert_eq!(c.test_point(&(-UnitVector3::Z)), SmallCircleResult::Outside);
    }

    #[test]
    fn test_boundary_rule_shared_by_all_point_tests() {
        let c = BoundingSmallCircle::new(UnitVector3::Z, AngularExtent::ZERO);
        for (angle, expected) in [(1e-6, SmallCircleResult::Inside), (1e-3, SmallCircleResult::Outside)] {
            let p = Rotation::create(UnitVector3::X, angle) * UnitVector3::Z;
            let multi_point = MultiPointOnSphere::new(vec![p]).unwrap();
            let polyline = PolylineOnSphere::new(vec![p, p]).unwrap();
            assert_eq!(c.test_point(&p), expected, "angle {angle}");
            assert_eq!(c.test_multi_point(&multi_point), expected, "angle {angle}");
            assert_eq!(c.test_polyline(&polyline), expected, "angle {angle}");
            assert_eq!(c.test_geometry(&GeometryOnSphere::Point(p)), expected, "angle {angle}");
            assert_eq!(c.test_geometry(&GeometryOnSphere::MultiPoint(multi_point)), expected, "angle {angle}");
        }
    }

    #[test]
    fn test_point_boundary_is_inside() {
        let c = BoundingSmallCircle::new(UnitVector3::Z, AngularExtent::HALF_PI);
        assert_eq!(c.test_point(&UnitVector3::X), SmallCircleResult::Inside);
    }

    #[test]
    fn test_arc_bulging_into_cap() {
        // Both endpoints are 40 degrees from the centre, but the arc passes 10 degrees from it.
        let c = cap(10.0, 0.0, 20.0);
        let arc = GreatCircleArc::new(ll(0.0, -39.0), ll(0.0, 39.0)).unwrap();
        assert_eq!(c.test_point(arc.start_point()), SmallCircleResult::Outside);
        assert_eq!(c.test_point(arc.end_point()), SmallCircleResult::Outside);
        assert_eq!(c.test_arc(&arc), SmallCircleResult::Intersecting);
    }

    #[test]
    fn test_arc_inside_and_outside() {
        let c = cap(0.0, 0.0, 30.0);
        let inside = GreatCircleArc::new(ll(0.0, -10.0), ll(5.0, 10.0)).unwrap();
        let outside = GreatCircleArc::new(ll(0.0, 60.0), ll(20.0, 80.0)).unwrap();
        assert_eq!(c.test_arc(&inside), SmallCircleResult::Inside);
        assert_eq!(c.test_arc(&outside), SmallCircleResult::Outside);
    }

    #[test]
    fn test_multi_point() {
        let c = cap(0.0, 0.0, 10.0);
        let inside = MultiPointOnSphere::new(vec![ll(0.0, 1.0), ll(2.0, 2.0)]).unwrap();
        let outside = MultiPointOnSphere::new(vec![ll(40.0, 1.0), ll(-30.0, 2.0)]).unwrap();
        let mixed_out_first = MultiPointOnSphere::new(vec![ll(40.0, 1.0), ll(0.0, 0.0)]).unwrap();
        let mixed_in_first = MultiPointOnSphere::new(vec![ll(0.0, 0.0), ll(40.0, 1.0)]).unwrap();
        assert_eq!(c.test_multi_point(&inside), SmallCircleResult::Inside);
        assert_eq!(c.test_multi_point(&outside), SmallCircleResult::Outside);
        assert_eq!(c.test_multi_point(&mixed_out_first), SmallCircleResult::Intersecting);
        assert_eq!(c.test_multi_point(&mixed_in_first), SmallCircleResult::Intersecting);
    }

    #[test]
    fn test_polyline() {
        let c = cap(0.0, 0.0, 10.0);
        let crossing = PolylineOnSphere::new(vec![ll(0.0, -20.0), ll(0.0, -15.0), ll(0.0, 20.0)]).unwrap();
        let away = PolylineOnSphere::new(vec![ll(30.0, 0.0), ll(30.0, 20.0)]).unwrap();
        assert_eq!(c.test_polyline(&crossing), SmallCircleResult::Intersecting);
        assert_eq!(c.test_polyline(&away), SmallCircleResult::Outside);
    }

    #[test]
    fn test_filled_polygon_enclosing_cap() {
        let c = cap(0.0, 0.0, 5.0);
        let big = PolygonOnSphere::new(vec![ll(-20.0, -20.0), ll(-20.0, 20.0), ll(20.0, 20.0), ll(20.0, -20.0)])
            .unwrap();
        assert_eq!(c.test_polygon(&big), SmallCircleResult::Outside);
        assert_eq!(c.test_filled_polygon(&big), SmallCircleResult::Intersecting);

        let elsewhere = PolygonOnSphere::new(vec![ll(40.0, 40.0), ll(40.0, 50.0), ll(50.0, 45.0)]).unwrap();
        assert_eq!(c.test_filled_polygon(&elsewhere), SmallCircleResult::Outside);
        assert_eq!(
            c.test_geometry(&GeometryOnSphere::from(big)),
            SmallCircleResult::Intersecting
        );
    }

    #[test]
    fn test_cap_against_cap() {
        let c = cap(0.0, 0.0, 20.0);
        assert_eq!(c.test_bounding_small_circle(&cap(0.0, 5.0, 5.0)), SmallCircleResult::Inside);
        assert_eq!(c.test_bounding_small_circle(&cap(0.0, 50.0, 10.0)), SmallCircleResult::Outside);
        assert_eq!(
            c.test_bounding_small_circle(&cap(0.0, 25.0, 10.0)),
            SmallCircleResult::Intersecting
        );
    }

    #[test]
    fn test_rotate_cap() {
        let c = cap(0.0, 0.0, 12.0);
        let r = Rotation::create(UnitVector3::Z, FRAC_PI_2);
        let rotated = &r * &c;
        assert_eq!(rotated.extent(), c.extent());
        assert_abs_diff_eq!(*rotated.centre(), ll(0.0, 90.0), epsilon = 1e-12);
    }

    #[test]
    fn test_builder_covers_points() {
        let points = [ll(1.0, 2.0), ll(-5.0, 3.0), ll(4.0, -6.0)];
        let mut builder = BoundingSmallCircleBuilder::new(ll(0.0, 0.0));
        for p in &points {
            builder.add_point(p);
        }
        let c = builder.get_bounding_small_circle(0.0);
        for p in &points {
            assert_eq!(c.test_point(p), SmallCircleResult::Inside);
        }
        let expected = ll(0.0, 0.0).angle_to(&ll(4.0, -6.0));
        assert!((c.extent().angle() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_builder_arc_uses_interior() {
        // The arc's far point lies beyond both endpoints as seen from the centre.
        let arc = GreatCircleArc::new(ll(0.0, 140.0), ll(0.0, -140.0)).unwrap();
        let mut builder = BoundingSmallCircleBuilder::new(ll(0.0, 0.0));
        builder.add_arc(&arc);
        let c = builder.get_bounding_small_circle(0.0);
        assert!((c.extent().angle() - std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_builder_add_cap() {
        let mut builder = BoundingSmallCircleBuilder::new(ll(0.0, 0.0));
        builder.add_bounding_small_circle(&cap(0.0, 30.0, 10.0));
        let c = builder.get_bounding_small_circle(0.0);
        assert!((c.extent().angle() - 40f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_builder_epsilon_expands() {
        let mut builder = BoundingSmallCircleBuilder::new(UnitVector3::Z);
        builder.add_point(&UnitVector3::X);
        let tight = builder.get_bounding_small_circle(0.0);
        let loose = builder.get_bounding_small_circle(1e-3);
        assert!(loose.extent() > tight.extent());
        let clamped = builder.get_bounding_small_circle(5.0);
        assert_eq!(clamped.extent(), AngularExtent::PI);
    }

    #[test]
    fn test_empty_builder_gives_zero_extent() {
        let builder = BoundingSmallCircleBuilder::new(UnitVector3::Y);
        let c = builder.get_bounding_small_circle(1e-6);
        assert_eq!(c.extent(), AngularExtent::ZERO);
        assert_eq!(c.centre(), &UnitVector3::Y);
    }
}
