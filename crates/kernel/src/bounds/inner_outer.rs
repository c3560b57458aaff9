use serde::{Deserialize, Serialize};
use std::ops::Mul;
use tracing::warn;

use super::{AngularExtent, BoundingSmallCircle, InnerOuterResult};
use crate::geometry::arc::GreatCircleArc;
use crate::geometry::rotation::Rotation;
use crate::geometry::shapes::{GeometryOnSphere, MultiPointOnSphere, PolygonOnSphere, PolylineOnSphere};
use crate::geometry::unit_vector::UnitVector3;

/// An annular bound: an outer cap, and a concentric inner cap that the bounded
/// geometry does not enter.
///
/// A query primitive entirely outside the outer cap, or entirely inside the
/// inner cap, cannot touch the bounded geometry. `inner_extent <= outer.extent()`
/// holds for every value produced by [`InnerOuterBoundingSmallCircleBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InnerOuterBoundingSmallCircle {
    outer: BoundingSmallCircle,
    inner_extent: AngularExtent,
}

impl InnerOuterBoundingSmallCircle {
    pub fn new(outer: BoundingSmallCircle, inner_extent: AngularExtent) -> Self {
        Self {
            outer,
            inner_extent,
        }
    }

    pub fn centre(&self) -> &UnitVector3 {
        self.outer.centre()
    }

    pub fn outer_bounding_small_circle(&self) -> &BoundingSmallCircle {
        &self.outer
    }

    pub fn outer_extent(&self) -> AngularExtent {
        self.outer.extent()
    }

    pub fn inner_extent(&self) -> AngularExtent {
        self.inner_extent
    }

    pub fn test_point(&self, point: &UnitVector3) -> InnerOuterResult {
        let dot = self.centre().dot(point);
        self.classify_dot_range(dot, dot)
    }

    pub fn test_arc(&self, arc: &GreatCircleArc) -> InnerOuterResult {
        let (min_dot, max_dot) = arc.dot_product_range(self.centre());
        self.classify_dot_range(min_dot, max_dot)
    }

    /// Short-circuits on the first point that lands in a different region than the first.
    pub fn test_multi_point(&self, multi_point: &MultiPointOnSphere) -> InnerOuterResult {
        let mut results = multi_point.points().iter().map(|p| self.test_point(p));
        let Some(first) = results.next() else {
            return InnerOuterResult::OutsideOuter;
        };
        if first == InnerOuterResult::Intersecting || results.any(|r| r != first) {
            InnerOuterResult::Intersecting
        } else {
            first
        }
    }

    pub fn test_polyline(&self, polyline: &PolylineOnSphere) -> InnerOuterResult {
        self.test_arcs(polyline.arcs())
    }

    /// Tests the polygon outline only; see [`Self::test_filled_polygon`].
    pub fn test_polygon(&self, polygon: &PolygonOnSphere) -> InnerOuterResult {
        self.test_arcs(polygon.arcs())
    }

    /// Outline test, then account for the polygon interior: an outline outside
    /// the outer cap that encircles the centre covers the whole annulus, and
    /// an outline inside the inner cap whose interior reaches round to the
    /// antipode of the centre covers it too.
    pub fn test_filled_polygon(&self, polygon: &PolygonOnSphere) -> InnerOuterResult {
        match self.test_polygon(polygon) {
            InnerOuterResult::OutsideOuter if polygon.is_point_in_polygon(self.centre()) => {
                InnerOuterResult::Intersecting
            }
            InnerOuterResult::InsideInner if polygon.is_point_in_polygon(&-*self.centre()) => {
                InnerOuterResult::Intersecting
            }
            result => result,
        }
    }

    /// Classify a cap against the annulus.
    pub fn test_bounding_small_circle(&self, other: &BoundingSmallCircle) -> InnerOuterResult {
        let separation = AngularExtent::from_cosine(self.centre().dot(other.centre()));
        if separation > self.outer_extent() + other.extent() {
            InnerOuterResult::OutsideOuter
        } else if separation + other.extent() < self.inner_extent {
            InnerOuterResult::InsideInner
        } else {
            InnerOuterResult::Intersecting
        }
    }

    /// Polygons are tested as filled regions.
    pub fn test_geometry(&self, geometry: &GeometryOnSphere) -> InnerOuterResult {
        match geometry {
            GeometryOnSphere::Point(p) => self.test_point(p),
            GeometryOnSphere::MultiPoint(m) => self.test_multi_point(m),
            GeometryOnSphere::Polyline(l) => self.test_polyline(l),
            GeometryOnSphere::Polygon(p) => self.test_filled_polygon(p),
        }
    }

    fn test_arcs(&self, arcs: &[GreatCircleArc]) -> InnerOuterResult {
        let mut min_dot = f64::INFINITY;
        let mut max_dot = f64::NEG_INFINITY;
        for arc in arcs {
            let (lo, hi) = arc.dot_product_range(self.centre());
            min_dot = min_dot.min(lo);
            max_dot = max_dot.max(hi);
            if self.classify_dot_range(min_dot, max_dot) == InnerOuterResult::Intersecting {
                return InnerOuterResult::Intersecting;
            }
        }
        self.classify_dot_range(min_dot, max_dot)
    }

    fn classify_dot_range(&self, min_dot: f64, max_dot: f64) -> InnerOuterResult {
        if max_dot < self.outer_extent().cosine() {
            InnerOuterResult::OutsideOuter
        } else if min_dot > self.inner_extent.cosine() {
            InnerOuterResult::InsideInner
        } else {
            InnerOuterResult::Intersecting
        }
    }
}

impl Mul<&InnerOuterBoundingSmallCircle> for &Rotation {
    type Output = InnerOuterBoundingSmallCircle;
    fn mul(self, rhs: &InnerOuterBoundingSmallCircle) -> Self::Output {
        InnerOuterBoundingSmallCircle::new(self * &rhs.outer, rhs.inner_extent)
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Accumulates an annular bound about a fixed centre.
///
/// `min_dot` is the smallest dot product with the centre seen so far (outer
/// cap); `max_dot` is the largest (inner cap). A larger `max_dot` means a
/// smaller inner cap.
#[derive(Debug, Clone)]
pub struct InnerOuterBoundingSmallCircleBuilder {
    centre: UnitVector3,
    min_dot: f64,
    max_dot: f64,
}

impl InnerOuterBoundingSmallCircleBuilder {
    pub fn new(centre: UnitVector3) -> Self {
        Self {
            centre,
            min_dot: 1.0,
            max_dot: -1.0,
        }
    }

    pub fn centre(&self) -> &UnitVector3 {
        &self.centre
    }

    pub fn add_point(&mut self, point: &UnitVector3) {
        let dot = point.dot(&self.centre);
        self.fold(dot, dot);
    }

    pub fn add_multi_point(&mut self, multi_point: &MultiPointOnSphere) {
        for p in multi_point.points() {
            self.add_point(p);
        }
    }

    pub fn add_arc(&mut self, arc: &GreatCircleArc) {
        let (min_dot, max_dot) = arc.dot_product_range(&self.centre);
        self.fold(min_dot, max_dot);
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

    /// Add a solid cap.
    ///
    /// If the cap does not reach our centre its nearest point is
    /// `angle(centres) - other.extent` away; otherwise nothing can be excluded
    /// and the inner cap collapses to zero.
    pub fn add_bounding_small_circle(&mut self, other: &BoundingSmallCircle) {
        let separation = AngularExtent::from_cosine(self.centre.dot(other.centre()));
        let furthest = separation + other.extent();

        let nearest = if separation > other.extent() {
            (separation - other.extent()).cosine()
        } else {
            1.0
        };
        self.fold(furthest.cosine(), nearest);
    }

    /// Add another annulus. Its geometry lies between its inner and outer caps, so:
    ///
    /// - our centre strictly inside its inner cap: nearest is `other.inner - angle(centres)`;
    /// - our centre strictly outside its outer cap: nearest is `angle(centres) - other.outer`;
    /// - our centre in its annulus: nothing can be excluded.
    pub fn add_inner_outer_bounding_small_circle(&mut self, other: &InnerOuterBoundingSmallCircle) {
        let separation = AngularExtent::from_cosine(self.centre.dot(other.centre()));
        let furthest = separation + other.outer_extent();

        let nearest = if separation < other.inner_extent() {
            (other.inner_extent() - separation).cosine()
        } else if separation > other.outer_extent() {
            (separation - other.outer_extent()).cosine()
        } else {
            1.0
        };
        self.fold(furthest.cosine(), nearest);
    }

    /// Finish the bound, expanding the outer cap and shrinking the inner cap by
    /// `epsilon` in dot-product space.
    ///
    /// If nothing was added the result is degenerate: both caps have zero extent.
    pub fn get_inner_outer_bounding_small_circle(&self, epsilon: f64) -> InnerOuterBoundingSmallCircle {
        if self.min_dot - self.max_dot > 1.0 {
            warn!(centre = ?self.centre, "no primitives added to inner/outer bounding small circle builder");
            return InnerOuterBoundingSmallCircle::new(
                BoundingSmallCircle::new(self.centre, AngularExtent::ZERO),
                AngularExtent::ZERO,
            );
        }
        let outer_cosine = (self.min_dot - epsilon).max(-1.0);
        let inner_cosine = (self.max_dot + epsilon).min(1.0).max(outer_cosine);
        InnerOuterBoundingSmallCircle::new(
            BoundingSmallCircle::new(self.centre, AngularExtent::from_cosine(outer_cosine)),
            AngularExtent::from_cosine(inner_cosine),
        )
    }

    fn fold(&mut self, min_dot: f64, max_dot: f64) {
        if min_dot < self.min_dot {
            self.min_dot = min_dot;
        }
        if max_dot > self.max_dot {
            self.max_dot = max_dot;
        }
    }
}
