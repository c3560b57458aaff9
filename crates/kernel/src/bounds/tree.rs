use tracing::{debug, instrument};

use super::{BoundingSmallCircle, SmallCircleResult, create_optimal_bounding_small_circle};
use crate::geometry::shapes::GeometryOnSphere;
use crate::geometry::unit_vector::UnitVector3;

/// Binary hierarchy of bounding small circles, built bottom-up.
///
/// Leaves keep the order they were given in; each level pairs adjacent nodes
/// and merges their caps with [`create_optimal_bounding_small_circle`]. An odd
/// node out is carried up to the next level unchanged. Queries return the
/// payloads of every leaf that could not be excluded.
#[derive(Debug, Clone)]
pub struct BoundingTree<P> {
    arena: Vec<Node>,
    payloads: Vec<P>,
    root: Option<NodeIdx>,
}

#[derive(Debug, Clone)]
enum Kind {
    Leaf(usize),
    Internal { left: NodeIdx, right: NodeIdx },
}

#[derive(Debug, Clone)]
struct Node {
    cap: BoundingSmallCircle,
    kind: Kind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl<P> BoundingTree<P> {
    #[instrument(skip(leaves))]
    pub fn build(leaves: Vec<(BoundingSmallCircle, P)>) -> Self {
        let mut arena = Vec::with_capacity(leaves.len().saturating_mul(2));
        let mut payloads = Vec::with_capacity(leaves.len());
        let mut level = Vec::with_capacity(leaves.len());

        for (cap, payload) in leaves {
            level.push(NodeIdx(arena.len()));
            arena.push(Node {
                cap,
                kind: Kind::Leaf(payloads.len()),
            });
            payloads.push(payload);
        }

        let mut depth = 0usize;
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                match *pair {
                    [left, right] => {
                        let cap =
                            create_optimal_bounding_small_circle(&arena[left.0].cap, &arena[right.0].cap);
                        next.push(NodeIdx(arena.len()));
                        arena.push(Node {
                            cap,
                            kind: Kind::Internal { left, right },
                        });
                    }
                    [single] => next.push(single),
                    _ => {}
                }
            }
            level = next;
            depth += 1;
        }

        debug!(leaves = payloads.len(), nodes = arena.len(), depth, "built bounding tree");
        Self {
            arena,
            payloads,
            root: level.first().copied(),
        }
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// The cap covering every leaf, if there are any.
    pub fn root_bounding_small_circle(&self) -> Option<&BoundingSmallCircle> {
        self.root.map(|idx| &self.arena[idx.0].cap)
    }

    pub fn payloads(&self) -> &[P] {
        &self.payloads
    }

    /// Payloads whose leaf cap does not exclude `point`.
    pub fn query_point(&self, point: &UnitVector3) -> Vec<&P> {
        self.collect(|cap| cap.test_point(point) != SmallCircleResult::Outside)
    }

    /// Payloads whose leaf cap may overlap `query`.
    pub fn query_bounding_small_circle(&self, query: &BoundingSmallCircle) -> Vec<&P> {
        self.collect(|cap| cap.test_bounding_small_circle(query) != SmallCircleResult::Outside)
    }

    fn collect(&self, mut keep: impl FnMut(&BoundingSmallCircle) -> bool) -> Vec<&P> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.arena[idx.0];
            if !keep(&node.cap) {
                continue;
            }
            match node.kind {
                Kind::Leaf(slot) => out.push(&self.payloads[slot]),
                Kind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }
}

impl BoundingTree<GeometryOnSphere> {
    /// Tree over geometries, each bounded about its own centroid.
    pub fn from_geometries(geometries: Vec<GeometryOnSphere>) -> Self {
        let leaves = geometries
            .into_iter()
            .map(|g| (g.bounding_small_circle(), g))
            .collect();
        Self::build(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::AngularExtent;
    use crate::geometry::lat_lon::LatLonPoint;
    use crate::geometry::shapes::PolylineOnSphere;

    fn ll(lat: f64, lon: f64) -> UnitVector3 {
        LatLonPoint::new(lat, lon).unwrap().to_unit_vector()
    }

    fn cap(lat: f64, lon: f64, degrees: f64) -> BoundingSmallCircle {
        BoundingSmallCircle::new(ll(lat, lon), AngularExtent::from_angle(degrees.to_radians()))
    }

    fn equator_tree() -> BoundingTree<usize> {
        let leaves = (0..7)
            .map(|i| (cap(0.0, i as f64 * 30.0, 5.0), i))
            .collect();
        BoundingTree::build(leaves)
    }

    #[test]
    fn test_empty_tree() {
        let tree: BoundingTree<u32> = BoundingTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.root_bounding_small_circle().is_none());
        assert!(tree.query_point(&UnitVector3::Z).is_empty());
    }

    #[test]
    fn test_single_leaf_is_root() {
        let c = cap(10.0, 10.0, 3.0);
        let tree = BoundingTree::build(vec![(c, "only")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_bounding_small_circle(), Some(&c));
        assert_eq!(tree.query_point(&ll(10.0, 10.0)), vec![&"only"]);
    }

    #[test]
    fn test_root_covers_all_leaves() {
        let tree = equator_tree();
        let root = tree.root_bounding_small_circle().unwrap();
        for i in 0..7 {
            let lon = i as f64 * 30.0;
            for p in [ll(0.0, lon), ll(0.0, lon - 4.9), ll(0.0, lon + 4.9), ll(4.9, lon)] {
                assert_eq!(root.test_point(&p), SmallCircleResult::Inside);
            }
        }
    }

    #[test]
    fn test_query_point_prunes() {
        let tree = equator_tree();
        assert_eq!(tree.query_point(&ll(1.0, 61.0)), vec![&2]);
        assert!(tree.query_point(&UnitVector3::Z).is_empty());
        assert!(tree.query_point(&ll(0.0, 45.0)).is_empty());
    }

    #[test]
    fn test_query_cap_returns_overlapping_leaves_in_order() {
        let tree = equator_tree();
        let query = cap(0.0, 45.0, 12.0);
        assert_eq!(tree.query_bounding_small_circle(&query), vec![&1, &2]);
    }

    #[test]
    fn test_from_geometries() {
        let near = GeometryOnSphere::from(
            PolylineOnSphere::new(vec![ll(0.0, 0.0), ll(0.0, 10.0)]).unwrap(),
        );
        let far = GeometryOnSphere::Point(ll(60.0, 120.0));
        let tree = BoundingTree::from_geometries(vec![near.clone(), far]);
        let hits = tree.query_point(&ll(0.0, 5.0));
        assert_eq!(hits, vec![&near]);
    }
}
