pub mod geometry;
pub mod bounds;

// Re-export the types callers reach for most often.
pub use bounds::{
    AngularExtent, BoundingSmallCircle, BoundingSmallCircleBuilder, BoundingTree,
    InnerOuterBoundingSmallCircle, InnerOuterBoundingSmallCircleBuilder, InnerOuterResult,
    SmallCircleResult, create_optimal_bounding_small_circle,
};
pub use geometry::rotation::Rotation;
pub use geometry::unit_vector::UnitVector3;
pub use geometry::vector::Vec3;
pub use geometry::{GeometryError, GeometryOnSphere};

/// Global tolerance configuration for spherical comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Accepted deviation of a unit vector's magnitude from one.
    pub unit_length: f64,
    /// Dot products within this of +/-1 are considered parallel/antiparallel.
    pub dot_product: f64,
    /// Cross products shorter than this are considered degenerate (aligned directions).
    pub degenerate_cross: f64,
    /// Default dot-product expansion applied by bounding circle builders.
    pub bounds_epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            unit_length: 1e-6,
            dot_product: 1e-12,
            degenerate_cross: 1e-12,
            bounds_epsilon: 1e-6,
        }
    }
}

impl Tolerance {
    /// True if `dot` is (within tolerance) `1`, i.e. the two unit vectors coincide.
    pub fn is_parallel_dot(&self, dot: f64) -> bool {
        dot >= 1.0 - self.dot_product
    }

    /// True if `dot` is (within tolerance) `-1`, i.e. the two unit vectors are antipodal.
    pub fn is_antiparallel_dot(&self, dot: f64) -> bool {
        dot <= -1.0 + self.dot_product
    }

    pub fn is_unit_length(&self, magnitude: f64) -> bool {
        (magnitude - 1.0).abs() <= self.unit_length
    }

    pub fn is_degenerate_cross(&self, length: f64) -> bool {
        length <= self.degenerate_cross
    }
}

/// Tolerances used by the kernel internally.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
