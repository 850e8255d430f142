//! Radial math shared by belts and rings, in the shape's local frame
//! (band in the XZ plane, Y is the out-of-plane axis).

use rand::{Rng, RngCore};

use crate::core::types::DVec3;
use crate::math::{Aabb, Containment};
use super::{HeightEnvelope, ShapeError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Annulus {
    pub radius: f64,
    pub width: f64,
    pub height: f64,
    pub envelope: HeightEnvelope,
}

impl Annulus {
    pub fn new(radius: f64, width: f64, height: f64, envelope: HeightEnvelope) -> Result<Self, ShapeError> {
        if !(radius >= 0.0 && radius.is_finite()) {
            return Err(ShapeError::InvalidParameters(format!("radius must be >= 0, got {radius}")));
        }
        if !(width > 0.0 && width.is_finite()) {
            return Err(ShapeError::InvalidParameters(format!("width must be > 0, got {width}")));
        }
        if !(height >= 0.0 && height.is_finite()) {
            return Err(ShapeError::InvalidParameters(format!("height must be >= 0, got {height}")));
        }
        Ok(Self { radius, width, height, envelope })
    }

    pub fn outer_radius(&self) -> f64 {
        self.radius + self.width
    }

    fn in_band(&self, distance: f64) -> bool {
        distance >= self.radius && distance <= self.outer_radius()
    }

    fn envelope_at(&self, distance: f64) -> f64 {
        let t = (distance - self.radius) / self.width;
        self.envelope.eval(t, self.height)
    }

    /// Half-thickness at a radial distance inside the band
    pub fn height_at(&self, distance: f64) -> Result<f64, ShapeError> {
        if !self.in_band(distance) {
            return Err(ShapeError::OutsideBand {
                distance,
                min: self.radius,
                max: self.outer_radius(),
            });
        }
        Ok(self.envelope_at(distance))
    }

    pub fn contains(&self, local: DVec3) -> Containment {
        let distance = local.x.hypot(local.z);
        if !self.in_band(distance) {
            return Containment::Disjoint;
        }
        if local.y.abs() <= self.envelope_at(distance) {
            Containment::Contains
        } else {
            Containment::Disjoint
        }
    }

    /// Projection onto the band midplane with the radius clamped into range
    pub fn closest_point(&self, local: DVec3) -> DVec3 {
        let distance = local.x.hypot(local.z);
        let dir = if distance > 0.0 {
            DVec3::new(local.x / distance, 0.0, local.z / distance)
        } else {
            DVec3::X
        };
        dir * distance.clamp(self.radius, self.outer_radius())
    }

    /// Random point on the band midline
    pub fn point_in_shape(&self, rng: &mut dyn RngCore) -> DVec3 {
        let angle: f64 = rng.random_range(0.0..std::f64::consts::TAU);
        let r = self.radius + self.width * 0.5;
        DVec3::new(r * angle.cos(), 0.0, r * angle.sin())
    }

    pub fn local_bounds(&self) -> Aabb {
        let r = self.outer_radius();
        let h = self.envelope.peak(self.height);
        Aabb::new(DVec3::new(-r, -h, -r), DVec3::new(r, h, r))
    }
}
