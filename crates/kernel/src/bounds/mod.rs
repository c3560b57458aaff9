//! Small-circle bounding volumes on the unit sphere.
//!
//! - [`BoundingSmallCircle`] is a spherical cap used like a bounding sphere.
//! - [`InnerOuterBoundingSmallCircle`] subtracts an inner cap that is known to
//!   be empty, giving a tighter annular bound.
//! - [`create_optimal_bounding_small_circle`] merges two caps for bottom-up
//!   hierarchy construction, as done by [`BoundingTree`].
//!
//! Builders are plain `&mut self` accumulators; use one per thread and merge
//! the finished caps.

pub mod angular_extent;
pub mod small_circle;
pub mod inner_outer;
pub mod merge;
pub mod tree;

use serde::{Deserialize, Serialize};

pub use angular_extent::AngularExtent;
pub use inner_outer::{InnerOuterBoundingSmallCircle, InnerOuterBoundingSmallCircleBuilder};
pub use merge::create_optimal_bounding_small_circle;
pub use small_circle::{BoundingSmallCircle, BoundingSmallCircleBuilder};
pub use tree::BoundingTree;

/// Classification of a primitive against a [`BoundingSmallCircle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmallCircleResult {
    Inside,
    Outside,
    Intersecting,
}

/// Classification of a primitive against an [`InnerOuterBoundingSmallCircle`].
///
/// There is no plain "inside": a primitive in the annulus between the caps is
/// `Intersecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InnerOuterResult {
    OutsideOuter,
    InsideInner,
    Intersecting,
}
