//! Placement region shapes.
//!
//! A placement shape decides whether a world point lies inside a region where
//! objects may be generated. Shapes are immutable values built from a
//! [`RegionConfig`] and are safe to query from several threads at once.

pub mod envelope;
pub mod annulus;
pub mod belt;
pub mod ring;
pub mod hollow_sphere;
pub mod cluster;
pub mod region;

pub use envelope::{HeightEnvelope, MIN_EDGE_HEIGHT};
pub use belt::Belt;
pub use ring::Ring;
pub use hollow_sphere::HollowSphere;
pub use cluster::Cluster;
pub use region::{RegionConfig, RegionSet};

use rand::RngCore;
use thiserror::Error;

use crate::core::types::DVec3;
use crate::math::{Aabb, Containment};

/// Geometric contract violations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("distance {distance} is outside the radial band [{min}, {max}]")]
    OutsideBand { distance: f64, min: f64, max: f64 },

    #[error("invalid shape parameters: {0}")]
    InvalidParameters(String),
}

/// Region in which generation may place objects
pub trait PlacementShape: Send + Sync + std::fmt::Debug {
    /// `Contains` when the point lies in the region, `Disjoint` otherwise
    fn contains(&self, point: DVec3) -> Containment;

    /// Nearest point of the shape to `point`
    fn closest_point(&self, point: DVec3) -> DVec3;

    /// A point inside the shape, for spawn and camera defaults
    fn point_in_shape(&self, rng: &mut dyn RngCore) -> DVec3;

    /// World-space box enclosing the whole shape
    fn bounds(&self) -> Aabb;
}

/// Unit direction from `from` to `to`, `+X` when the two coincide
pub(crate) fn direction_or_x(from: DVec3, to: DVec3) -> (DVec3, f64) {
    let delta = to - from;
    let distance = delta.length();
    if distance > 0.0 {
        (delta / distance, distance)
    } else {
        (DVec3::X, 0.0)
    }
}

/// Uniformly distributed unit vector
pub(crate) fn random_direction(rng: &mut dyn RngCore) -> DVec3 {
    use rand::Rng;
    let z: f64 = rng.random_range(-1.0..=1.0);
    let phi: f64 = rng.random_range(0.0..std::f64::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    DVec3::new(r * phi.cos(), r * phi.sin(), z)
}
