//! Bounding sphere

use crate::core::types::DVec3;
use super::{Aabb, Containment};

/// Sphere given by center and radius
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains_point(&self, p: DVec3) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    /// Sphere/box overlap. A sphere exactly touching the box counts.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        aabb.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Classify a box against this sphere
    pub fn contains_aabb(&self, aabb: &Aabb) -> Containment {
        if !self.intersects_aabb(aabb) {
            return Containment::Disjoint;
        }
        if aabb.corners().iter().all(|&c| self.contains_point(c)) {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Smallest box enclosing the sphere
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extent(self.center, DVec3::splat(self.radius))
    }
}
