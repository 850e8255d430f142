//! Ball-shaped cluster region

use rand::RngCore;

use crate::core::types::DVec3;
use crate::math::{Aabb, BoundingSphere, Containment};
use super::{PlacementShape, ShapeError, direction_or_x};

/// Points within `radius` of `center`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    sphere: BoundingSphere,
}

impl Cluster {
    pub fn new(center: DVec3, radius: f64) -> Result<Self, ShapeError> {
        if !(radius >= 0.0 && radius.is_finite()) {
            return Err(ShapeError::InvalidParameters(format!("cluster radius must be >= 0, got {radius}")));
        }
        Ok(Self { sphere: BoundingSphere::new(center, radius) })
    }

    pub fn center(&self) -> DVec3 {
        self.sphere.center
    }

    pub fn radius(&self) -> f64 {
        self.sphere.radius
    }
}

impl PlacementShape for Cluster {
    fn contains(&self, point: DVec3) -> Containment {
        if self.sphere.contains_point(point) {
            Containment::Contains
        } else {
            Containment::Disjoint
        }
    }

    /// Projection onto the boundary sphere along the direction from the center
    fn closest_point(&self, point: DVec3) -> DVec3 {
        let (dir, _) = direction_or_x(self.sphere.center, point);
        self.sphere.center + dir * self.sphere.radius
    }

    fn point_in_shape(&self, _rng: &mut dyn RngCore) -> DVec3 {
        self.sphere.center
    }

    fn bounds(&self) -> Aabb {
        self.sphere.aabb()
    }
}
