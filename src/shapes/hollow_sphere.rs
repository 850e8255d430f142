//! Spherical shell between an inner and an outer radius

use rand::RngCore;

use crate::core::types::DVec3;
use crate::math::{Aabb, Containment};
use super::{PlacementShape, ShapeError, direction_or_x, random_direction};

/// Points with `inner < |p - center| <= outer`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HollowSphere {
    center: DVec3,
    inner: f64,
    outer: f64,
}

impl HollowSphere {
    pub fn new(center: DVec3, inner: f64, outer: f64) -> Result<Self, ShapeError> {
        if !(inner >= 0.0 && outer > inner && outer.is_finite()) {
            return Err(ShapeError::InvalidParameters(format!(
                "hollow sphere needs 0 <= inner < outer, got inner {inner}, outer {outer}"
            )));
        }
        Ok(Self { center, inner, outer })
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer
    }
}

impl PlacementShape for HollowSphere {
    fn contains(&self, point: DVec3) -> Containment {
        let distance = self.center.distance(point);
        if distance > self.inner && distance <= self.outer {
            Containment::Contains
        } else {
            Containment::Disjoint
        }
    }

    fn closest_point(&self, point: DVec3) -> DVec3 {
        let (dir, distance) = direction_or_x(self.center, point);
        if distance <= self.inner {
            self.center + dir * self.inner
        } else if distance > self.outer {
            self.center + dir * self.outer
        } else {
            point
        }
    }

    fn point_in_shape(&self, rng: &mut dyn RngCore) -> DVec3 {
        self.center + random_direction(rng) * ((self.inner + self.outer) * 0.5)
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extent(self.center, DVec3::splat(self.outer))
    }
}
