//! Ring around a body, in an arbitrarily rotated plane

use rand::RngCore;

use crate::core::types::{DMat3, DQuat, DVec3, EulerRot};
use crate::math::{Aabb, Containment};
use super::annulus::Annulus;
use super::{HeightEnvelope, PlacementShape, ShapeError};

/// Annulus whose plane is rotated by yaw/pitch/roll (degrees) around its center.
///
/// The rotation is converted to a basis once; queries transform the point
/// into the local frame and reuse the belt math.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    center: DVec3,
    /// Local to world
    basis: DMat3,
    /// World to local
    inverse: DMat3,
    band: Annulus,
}

impl Ring {
    pub fn new(
        center: DVec3,
        radius: f64,
        width: f64,
        height: f64,
        rotation_degrees: DVec3,
        envelope: HeightEnvelope,
    ) -> Result<Self, ShapeError> {
        let band = Annulus::new(radius, width, height, envelope)?;
        let rotation = DQuat::from_euler(
            EulerRot::YXZ,
            rotation_degrees.x.to_radians(),
            rotation_degrees.y.to_radians(),
            rotation_degrees.z.to_radians(),
        );
        let basis = DMat3::from_quat(rotation);
        Ok(Self { center, basis, inverse: basis.transpose(), band })
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Normal of the ring plane in world space
    pub fn normal(&self) -> DVec3 {
        self.basis * DVec3::Y
    }

    fn to_local(&self, point: DVec3) -> DVec3 {
        self.inverse * (point - self.center)
    }

    fn to_world(&self, local: DVec3) -> DVec3 {
        self.center + self.basis * local
    }

    /// Half-thickness at in-plane distance `distance` from the center.
    ///
    /// Fails with [`ShapeError::OutsideBand`] outside `[radius, radius + width]`.
    pub fn height_at(&self, distance: f64) -> Result<f64, ShapeError> {
        self.band.height_at(distance)
    }

    /// Half-thickness under a world point
    pub fn height_at_point(&self, point: DVec3) -> Result<f64, ShapeError> {
        let local = self.to_local(point);
        self.band.height_at(local.x.hypot(local.z))
    }
}

impl PlacementShape for Ring {
    fn contains(&self, point: DVec3) -> Containment {
        self.band.contains(self.to_local(point))
    }

    fn closest_point(&self, point: DVec3) -> DVec3 {
        self.to_world(self.band.closest_point(self.to_local(point)))
    }

    fn point_in_shape(&self, rng: &mut dyn RngCore) -> DVec3 {
        self.to_world(self.band.point_in_shape(rng))
    }

    fn bounds(&self) -> Aabb {
        let local = self.band.local_bounds();
        let mut corners = local.corners().into_iter().map(|c| self.to_world(c));
        let first = corners.next().unwrap_or(self.center);
        let mut aabb = Aabb::new(first, first);
        for c in corners {
            aabb.expand(c);
        }
        aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const R: f64 = 50_000.0;
    const W: f64 = 10_000.0;
    const H: f64 = 2_000.0;

    fn flat_ring() -> Ring {
        Ring::new(DVec3::ZERO, R, W, H, DVec3::ZERO, HeightEnvelope::Sine).unwrap()
    }

    #[test]
    fn test_inner_edge_contains() {
        assert_eq!(flat_ring().contains(DVec3::new(R, 0.0, 0.0)), Containment::Contains);
    }

    #[test]
    fn test_beyond_outer_edge_disjoint() {
        assert_eq!(flat_ring().contains(DVec3::new(R + W + 1.0, 0.0, 0.0)), Containment::Disjoint);
    }

    #[test]
    fn test_above_envelope_disjoint() {
        let ring = flat_ring();
        let d = R + W / 2.0;
        let h = ring.height_at(d).unwrap();
        assert_eq!(ring.contains(DVec3::new(0.0, h - 1.0, d)), Containment::Contains);
        assert_eq!(ring.contains(DVec3::new(0.0, h + 1.0, d)), Containment::Disjoint);
    }

    #[test]
    fn test_rotated_plane() {
        // Pitch by 90 degrees stands the ring up; the old vertical becomes in-plane
        let ring = Ring::new(DVec3::ZERO, R, W, H, DVec3::new(0.0, 90.0, 0.0), HeightEnvelope::Sine).unwrap();
        let normal = ring.normal();
        assert!(normal.y.abs() < 1e-9);

        let in_plane = normal.any_orthonormal_vector() * (R + W / 2.0);
        assert_eq!(ring.contains(in_plane), Containment::Contains);
        assert_eq!(ring.contains(normal * (R + W / 2.0)), Containment::Disjoint);
    }

    #[test]
    fn test_closest_point_on_band() {
        let ring = Ring::new(DVec3::new(100.0, 0.0, 0.0), R, W, H, DVec3::new(30.0, 20.0, 10.0), HeightEnvelope::Sine).unwrap();
        let far = DVec3::new(1e7, 3e6, -2e6);
        let p = ring.closest_point(far);
        let local = ring.to_local(p);
        assert!(local.y.abs() < 1e-6);
        assert!((local.x.hypot(local.z) - (R + W)).abs() < 1e-6);
        assert!(((p - ring.center()).length() - (R + W)).abs() < 1e-6);
    }

    #[test]
    fn test_height_outside_band_is_error() {
        let ring = flat_ring();
        assert!(matches!(ring.height_at_point(DVec3::ZERO), Err(ShapeError::OutsideBand { .. })));
    }

    #[test]
    fn test_point_in_shape_is_inside() {
        let ring = Ring::new(DVec3::splat(5.0), R, W, H, DVec3::new(45.0, 10.0, 0.0), HeightEnvelope::SineSquared).unwrap();
        let mut rng = rand_pcg::Pcg32::seed_from_u64(9);
        for _ in 0..32 {
            let p = ring.point_in_shape(&mut rng);
            assert_eq!(ring.contains(p), Containment::Contains);
            assert!(ring.bounds().contains_point(p));
        }
    }
}
