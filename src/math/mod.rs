//! Mathematical utilities and bounding volumes

pub mod aabb;
pub mod sphere;
pub mod bounds;

pub use aabb::Aabb;
pub use sphere::BoundingSphere;
pub use bounds::Bounds;

/// Result of testing a point or volume against another volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// No overlap at all
    Disjoint,
    /// Partial overlap
    Intersects,
    /// Fully inside
    Contains,
}

impl Containment {
    /// True for anything but `Disjoint`.
    pub fn is_inside(self) -> bool {
        self != Containment::Disjoint
    }
}
