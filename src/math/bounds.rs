//! Query volume that is either a sphere or a box

use super::{Aabb, BoundingSphere, Containment};

/// Volume used for range queries and load/unload marking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    Sphere(BoundingSphere),
    Box(Aabb),
}

impl Bounds {
    /// Enclosing box, used to enumerate candidate grid cells
    pub fn aabb(&self) -> Aabb {
        match self {
            Bounds::Sphere(s) => s.aabb(),
            Bounds::Box(b) => *b,
        }
    }

    /// Inclusive overlap test against a box
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        match self {
            Bounds::Sphere(s) => s.intersects_aabb(aabb),
            Bounds::Box(b) => b.intersects(aabb),
        }
    }

    /// Classify a box against this volume
    pub fn contains_aabb(&self, aabb: &Aabb) -> Containment {
        match self {
            Bounds::Sphere(s) => s.contains_aabb(aabb),
            Bounds::Box(b) => b.contains_aabb(aabb),
        }
    }
}

impl From<BoundingSphere> for Bounds {
    fn from(sphere: BoundingSphere) -> Self {
        Bounds::Sphere(sphere)
    }
}

impl From<Aabb> for Bounds {
    fn from(aabb: Aabb) -> Self {
        Bounds::Box(aabb)
    }
}
