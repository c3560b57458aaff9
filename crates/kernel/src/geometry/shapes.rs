use serde::{Deserialize, Serialize};

use super::arc::{GreatCircleArc, arcs_cross};
use super::unit_vector::UnitVector3;
use super::vector::Vec3;
use super::GeometryError;
use crate::bounds::{BoundingSmallCircle, BoundingSmallCircleBuilder};

/// The closed set of geometry shapes the kernel rotates and bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryOnSphere {
    Point(UnitVector3),
    MultiPoint(MultiPointOnSphere),
    Polyline(PolylineOnSphere),
    Polygon(PolygonOnSphere),
}

impl GeometryOnSphere {
    /// Every point (vertex) of the geometry, in order.
    pub fn points(&self) -> &[UnitVector3] {
        match self {
            GeometryOnSphere::Point(p) => std::slice::from_ref(p),
            GeometryOnSphere::MultiPoint(m) => m.points(),
            GeometryOnSphere::Polyline(l) => l.vertices(),
            GeometryOnSphere::Polygon(p) => p.vertices(),
        }
    }

    pub fn centroid(&self) -> UnitVector3 {
        match self {
            GeometryOnSphere::Point(p) => *p,
            GeometryOnSphere::MultiPoint(m) => *m.centroid(),
            GeometryOnSphere::Polyline(l) => *l.centroid(),
            GeometryOnSphere::Polygon(p) => *p.centroid(),
        }
    }

    /// A bounding small circle centred on the geometry's centroid.
    pub fn bounding_small_circle(&self) -> BoundingSmallCircle {
        let mut builder = BoundingSmallCircleBuilder::new(self.centroid());
        builder.add_geometry(self);
        builder.get_bounding_small_circle(crate::default_tolerance().bounds_epsilon)
    }
}

impl From<UnitVector3> for GeometryOnSphere {
    fn from(p: UnitVector3) -> Self {
        GeometryOnSphere::Point(p)
    }
}

impl From<MultiPointOnSphere> for GeometryOnSphere {
    fn from(m: MultiPointOnSphere) -> Self {
        GeometryOnSphere::MultiPoint(m)
    }
}

impl From<PolylineOnSphere> for GeometryOnSphere {
    fn from(l: PolylineOnSphere) -> Self {
        GeometryOnSphere::Polyline(l)
    }
}

impl From<PolygonOnSphere> for GeometryOnSphere {
    fn from(p: PolygonOnSphere) -> Self {
        GeometryOnSphere::Polygon(p)
    }
}

/// Normalised vertex sum; falls back to the first point when the points cancel out.
fn centroid_of(points: &[UnitVector3]) -> UnitVector3 {
    let sum = points
        .iter()
        .fold(Vec3::ZERO, |acc, p| acc + p.to_vec3());
    UnitVector3::from_vec3_normalized(&sum).unwrap_or(points[0])
}

fn require_points(kind: &'static str, required: usize, actual: usize) -> Result<(), GeometryError> {
    if actual < required {
        return Err(GeometryError::InsufficientPoints {
            kind,
            required,
            actual,
        });
    }
    Ok(())
}

// ─── MultiPoint ─────────────────────────────────────────────────────────────

/// An unordered, non-empty collection of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<UnitVector3>", into = "Vec<UnitVector3>")]
pub struct MultiPointOnSphere {
    points: Vec<UnitVector3>,
    centroid: UnitVector3,
}

impl MultiPointOnSphere {
    pub fn new(points: Vec<UnitVector3>) -> Result<Self, GeometryError> {
        require_points("multipoint", 1, points.len())?;
        let centroid = centroid_of(&points);
        Ok(Self { points, centroid })
    }

    pub(crate) fn from_parts(points: Vec<UnitVector3>, centroid: UnitVector3) -> Self {
        Self { points, centroid }
    }

    pub fn points(&self) -> &[UnitVector3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; construction requires at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid(&self) -> &UnitVector3 {
        &self.centroid
    }
}

impl TryFrom<Vec<UnitVector3>> for MultiPointOnSphere {
    type Error = GeometryError;
    fn try_from(points: Vec<UnitVector3>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<MultiPointOnSphere> for Vec<UnitVector3> {
    fn from(m: MultiPointOnSphere) -> Self {
        m.points
    }
}

// ─── Polyline ───────────────────────────────────────────────────────────────

/// A connected sequence of great circle arcs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<UnitVector3>", into = "Vec<UnitVector3>")]
pub struct PolylineOnSphere {
    vertices: Vec<UnitVector3>,
    arcs: Vec<GreatCircleArc>,
    centroid: UnitVector3,
}

impl PolylineOnSphere {
    /// Requires at least two vertices and no antipodal consecutive vertices.
    pub fn new(vertices: Vec<UnitVector3>) -> Result<Self, GeometryError> {
        require_points("polyline", 2, vertices.len())?;
        let arcs = vertices
            .windows(2)
            .map(|w| GreatCircleArc::new(w[0], w[1]))
            .collect::<Result<Vec<_>, _>>()?;
        let centroid = centroid_of(&vertices);
        Ok(Self {
            vertices,
            arcs,
            centroid,
        })
    }

    pub(crate) fn from_parts(
        vertices: Vec<UnitVector3>,
        arcs: Vec<GreatCircleArc>,
        centroid: UnitVector3,
    ) -> Self {
        Self {
            vertices,
            arcs,
            centroid,
        }
    }

    pub fn vertices(&self) -> &[UnitVector3] {
        &self.vertices
    }

    pub fn arcs(&self) -> &[GreatCircleArc] {
        &self.arcs
    }

    pub fn centroid(&self) -> &UnitVector3 {
        &self.centroid
    }

    pub fn arc_length(&self) -> f64 {
        self.arcs.iter().map(GreatCircleArc::arc_length).sum()
    }
}

impl TryFrom<Vec<UnitVector3>> for PolylineOnSphere {
    type Error = GeometryError;
    fn try_from(vertices: Vec<UnitVector3>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<PolylineOnSphere> for Vec<UnitVector3> {
    fn from(l: PolylineOnSphere) -> Self {
        l.vertices
    }
}

// ─── Polygon ────────────────────────────────────────────────────────────────

/// A closed ring of great circle arcs (the last vertex joins back to the first).
///
/// The antipode of the vertex centroid is the exterior reference point: the
/// interior is every point an odd number of edge crossings away from it. The
/// centroid itself need not be inside (a concave polygon can wrap around it),
/// and polygons covering the antipode are not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<UnitVector3>", into = "Vec<UnitVector3>")]
pub struct PolygonOnSphere {
    vertices: Vec<UnitVector3>,
    arcs: Vec<GreatCircleArc>,
    centroid: UnitVector3,
}

impl PolygonOnSphere {
    /// Requires at least three vertices and no antipodal adjacent vertices.
    pub fn new(vertices: Vec<UnitVector3>) -> Result<Self, GeometryError> {
        require_points("polygon", 3, vertices.len())?;
        let n = vertices.len();
        let arcs = (0..n)
            .map(|i| GreatCircleArc::new(vertices[i], vertices[(i + 1) % n]))
            .collect::<Result<Vec<_>, _>>()?;
        let centroid = centroid_of(&vertices);
        Ok(Self {
            vertices,
            arcs,
            centroid,
        })
    }

    pub(crate) fn from_parts(
        vertices: Vec<UnitVector3>,
        arcs: Vec<GreatCircleArc>,
        centroid: UnitVector3,
    ) -> Self {
        Self {
            vertices,
            arcs,
            centroid,
        }
    }

    pub fn vertices(&self) -> &[UnitVector3] {
        &self.vertices
    }

    /// Boundary arcs, including the closing arc.
    pub fn arcs(&self) -> &[GreatCircleArc] {
        &self.arcs
    }

    pub fn centroid(&self) -> &UnitVector3 {
        &self.centroid
    }

    /// Point-in-polygon by crossing parity.
    ///
    /// Counts boundary crossings along a path from `point` to the antipode of
    /// the centroid; an odd count means `point` is inside. Points near the
    /// centroid take a two-leg path through a perpendicular point so that no
    /// leg approaches antipodal endpoints.
    pub fn is_point_in_polygon(&self, point: &UnitVector3) -> bool {
        let outside = -self.centroid;
        if point.is_coincident_with(&outside) {
            return false;
        }
        let crossings = if point.dot(&outside) < -0.5 {
            let via = point.generate_perpendicular();
            self.count_crossings(point, &via) + self.count_crossings(&via, &outside)
        } else {
            self.count_crossings(point, &outside)
        };
        crossings % 2 == 1
    }

    fn count_crossings(&self, from: &UnitVector3, to: &UnitVector3) -> usize {
        self.arcs
            .iter()
            .filter(|arc| arcs_cross(from, to, arc.start_point(), arc.end_point()))
            .count()
    }
}

impl TryFrom<Vec<UnitVector3>> for PolygonOnSphere {
    type Error = GeometryError;
    fn try_from(vertices: Vec<UnitVector3>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<PolygonOnSphere> for Vec<UnitVector3> {
    fn from(p: PolygonOnSphere) -> Self {
        p.vertices
    }
}
