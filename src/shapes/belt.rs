//! Flat asteroid belt around a center, lying in the horizontal plane

use rand::RngCore;

use crate::core::types::DVec3;
use crate::math::{Aabb, Containment};
use super::annulus::Annulus;
use super::{HeightEnvelope, PlacementShape, ShapeError};

/// Annulus in the XZ plane with a lens-shaped vertical profile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Belt {
    center: DVec3,
    band: Annulus,
}

impl Belt {
    pub fn new(
        center: DVec3,
        radius: f64,
        width: f64,
        height: f64,
        envelope: HeightEnvelope,
    ) -> Result<Self, ShapeError> {
        Ok(Self { center, band: Annulus::new(radius, width, height, envelope)? })
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Half-thickness at horizontal distance `distance` from the center.
    ///
    /// Fails with [`ShapeError::OutsideBand`] outside `[radius, radius + width]`.
    pub fn height_at(&self, distance: f64) -> Result<f64, ShapeError> {
        self.band.height_at(distance)
    }
}

impl PlacementShape for Belt {
    fn contains(&self, point: DVec3) -> Containment {
        self.band.contains(point - self.center)
    }

    fn closest_point(&self, point: DVec3) -> DVec3 {
        self.center + self.band.closest_point(point - self.center)
    }

    fn point_in_shape(&self, rng: &mut dyn RngCore) -> DVec3 {
        self.center + self.band.point_in_shape(rng)
    }

    fn bounds(&self) -> Aabb {
        let local = self.band.local_bounds();
        Aabb::new(local.min + self.center, local.max + self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::MIN_EDGE_HEIGHT;

    fn belt() -> Belt {
        Belt::new(DVec3::ZERO, 10_000.0, 2_000.0, 800.0, HeightEnvelope::Sine).unwrap()
    }

    #[test]
    fn test_contains_inner_edge() {
        assert_eq!(belt().contains(DVec3::new(10_000.0, 0.0, 0.0)), Containment::Contains);
        assert_eq!(belt().contains(DVec3::new(0.0, 0.0, -10_000.0)), Containment::Contains);
    }

    #[test]
    fn test_outside_band_is_disjoint() {
        assert_eq!(belt().contains(DVec3::new(12_001.0, 0.0, 0.0)), Containment::Disjoint);
        assert_eq!(belt().contains(DVec3::new(9_999.0, 0.0, 0.0)), Containment::Disjoint);
    }

    #[test]
    fn test_vertical_envelope() {
        let b = belt();
        assert_eq!(b.contains(DVec3::new(11_000.0, 799.0, 0.0)), Containment::Contains);
        assert_eq!(b.contains(DVec3::new(11_000.0, -801.0, 0.0)), Containment::Disjoint);
        // Near the edges only the minimum thickness remains
        assert_eq!(b.contains(DVec3::new(10_000.0, MIN_EDGE_HEIGHT + 1.0, 0.0)), Containment::Disjoint);
    }

    #[test]
    fn test_height_at_outside_band_fails() {
        let b = belt();
        assert!(b.height_at(11_000.0).is_ok());
        assert_eq!(
            b.height_at(500.0),
            Err(ShapeError::OutsideBand { distance: 500.0, min: 10_000.0, max: 12_000.0 })
        );
    }

    #[test]
    fn test_closest_point_clamps() {
        let b = belt();
        let inside = b.closest_point(DVec3::new(0.0, 300.0, 11_000.0));
        assert_eq!(inside, DVec3::new(0.0, 0.0, 11_000.0));
        let far = b.closest_point(DVec3::new(50_000.0, 10.0, 0.0));
        assert_eq!(far, DVec3::new(12_000.0, 0.0, 0.0));
        let near = b.closest_point(DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(near, DVec3::new(10_000.0, 0.0, 0.0));
    }

    #[test]
    fn test_offset_center() {
        let b = Belt::new(DVec3::new(1e6, 0.0, 0.0), 100.0, 50.0, 200.0, HeightEnvelope::Sine).unwrap();
        assert_eq!(b.contains(DVec3::new(1e6 + 120.0, 0.0, 0.0)), Containment::Contains);
        assert_eq!(b.contains(DVec3::new(120.0, 0.0, 0.0)), Containment::Disjoint);
        assert!(b.bounds().contains_point(DVec3::new(1e6 + 150.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rejects_zero_width() {
        assert!(Belt::new(DVec3::ZERO, 10.0, 0.0, 10.0, HeightEnvelope::Sine).is_err());
    }
}
