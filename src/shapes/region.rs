//! Region configuration records and the set of active placement shapes

use serde::{Deserialize, Serialize};

use crate::core::types::DVec3;
use crate::math::Aabb;
use super::{Belt, Cluster, HeightEnvelope, HollowSphere, PlacementShape, Ring, ShapeError};

/// Serialized description of one placement region
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionConfig {
    Belt {
        #[serde(default)]
        center: DVec3,
        radius: f64,
        width: f64,
        height: f64,
    },
    Ring {
        center: DVec3,
        radius: f64,
        width: f64,
        height: f64,
        /// Yaw, pitch, roll in degrees
        #[serde(default)]
        rotation: DVec3,
    },
    HollowSphere {
        center: DVec3,
        inner_radius: f64,
        outer_radius: f64,
    },
    Cluster {
        center: DVec3,
        radius: f64,
    },
}

impl RegionConfig {
    /// Build the shape. Belts and rings use `envelope` for their profile.
    pub fn build(&self, envelope: HeightEnvelope) -> Result<Box<dyn PlacementShape>, ShapeError> {
        Ok(match *self {
            RegionConfig::Belt { center, radius, width, height } => {
                Box::new(Belt::new(center, radius, width, height, envelope)?)
            }
            RegionConfig::Ring { center, radius, width, height, rotation } => {
                Box::new(Ring::new(center, radius, width, height, rotation, envelope)?)
            }
            RegionConfig::HollowSphere { center, inner_radius, outer_radius } => {
                Box::new(HollowSphere::new(center, inner_radius, outer_radius)?)
            }
            RegionConfig::Cluster { center, radius } => Box::new(Cluster::new(center, radius)?),
        })
    }
}

/// Regions in which candidates are accepted
#[derive(Debug, Default)]
pub struct RegionSet {
    shapes: Vec<Box<dyn PlacementShape>>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[RegionConfig], envelope: HeightEnvelope) -> Result<Self, ShapeError> {
        let shapes = configs
            .iter()
            .map(|c| c.build(envelope))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { shapes })
    }

    pub fn push(&mut self, shape: Box<dyn PlacementShape>) {
        self.shapes.push(shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Box<dyn PlacementShape>] {
        &self.shapes
    }

    /// True if any region contains the point
    pub fn contains(&self, point: DVec3) -> bool {
        self.shapes.iter().any(|s| s.contains(point).is_inside())
    }

    /// True if any region's bounds touch `aabb`; a cheap cell pre-filter
    pub fn may_intersect(&self, aabb: &Aabb) -> bool {
        self.shapes.iter().any(|s| s.bounds().intersects(aabb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_build() {
        let json = r#"[
            {"kind": "belt", "radius": 1000.0, "width": 200.0, "height": 300.0},
            {"kind": "ring", "center": [5000.0, 0.0, 0.0], "radius": 400.0, "width": 100.0, "height": 150.0, "rotation": [0.0, 15.0, 0.0]},
            {"kind": "hollow_sphere", "center": [0.0, 0.0, 0.0], "inner_radius": 100.0, "outer_radius": 500.0},
            {"kind": "cluster", "center": [0.0, 9000.0, 0.0], "radius": 50.0}
        ]"#;
        let configs: Vec<RegionConfig> = serde_json::from_str(json).unwrap();
        assert_eq!(configs.len(), 4);
        assert!(matches!(configs[0], RegionConfig::Belt { center, .. } if center == DVec3::ZERO));

        let set = RegionSet::from_configs(&configs, HeightEnvelope::Sine).unwrap();
        assert_eq!(set.len(), 4);
        assert!(set.contains(DVec3::new(1100.0, 0.0, 0.0)));
        assert!(set.contains(DVec3::new(0.0, 9010.0, 0.0)));
        assert!(!set.contains(DVec3::new(0.0, 5000.0, 0.0)));
    }

    #[test]
    fn test_invalid_region_fails_build() {
        let configs = vec![RegionConfig::HollowSphere {
            center: DVec3::ZERO,
            inner_radius: 10.0,
            outer_radius: 5.0,
        }];
        assert!(RegionSet::from_configs(&configs, HeightEnvelope::Sine).is_err());
    }

    #[test]
    fn test_may_intersect() {
        let configs = vec![RegionConfig::Cluster { center: DVec3::ZERO, radius: 100.0 }];
        let set = RegionSet::from_configs(&configs, HeightEnvelope::Sine).unwrap();
        assert!(set.may_intersect(&Aabb::new(DVec3::splat(50.0), DVec3::splat(150.0))));
        assert!(!set.may_intersect(&Aabb::new(DVec3::splat(500.0), DVec3::splat(600.0))));
    }
}
