//! Candidate objects derived from a cell seed

use serde::{Deserialize, Serialize};

use crate::bridge::Materialized;
use crate::core::types::DVec3;
use crate::grid::CellCoord;
use crate::math::{Aabb, BoundingSphere};

/// Kind of object a seed stands for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedType {
    Empty,
    Asteroid,
    AsteroidCluster,
}

/// Deterministic part of an object seed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectSeedParams {
    /// Index within the owning cell
    pub index: u32,
    /// Per-object seed for sub-generation
    pub seed: i32,
    /// Seed handed to shape synthesis
    pub generator_seed: i32,
    pub seed_type: SeedType,
}

/// One candidate placeable object inside a cell
#[derive(Debug)]
pub struct ObjectSeed {
    pub cell: CellCoord,
    pub params: ObjectSeedParams,
    pub position: DVec3,
    /// Edge length estimate in world units
    pub size: f64,
    pub generated: bool,
    /// Back-reference to the materialized object while it exists
    pub user_data: Option<Materialized>,
}

impl ObjectSeed {
    pub fn new(cell: CellCoord, params: ObjectSeedParams, position: DVec3, size: f64) -> Self {
        Self {
            cell,
            params,
            position,
            size,
            generated: false,
            user_data: None,
        }
    }

    /// Stable name derived from cell, index and seed.
    ///
    /// Position never enters the name: it is too imprecise at world scale.
    pub fn name(&self) -> String {
        format!(
            "ProcAsteroid_{}_{}_{}_{}_{}",
            self.cell.x, self.cell.y, self.cell.z, self.params.index, self.params.seed
        )
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center_half_extent(self.position, DVec3::splat(self.size * 0.5))
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.position, self.size * 0.5 * 3f64.sqrt())
    }
}
