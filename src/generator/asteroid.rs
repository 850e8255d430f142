//! Asteroid field cell generator.
//!
//! Each cell is split into a regular lattice of sub-cells whose edge follows
//! the maximum object size divided by the effective density. Every sub-cell
//! yields one candidate with a jittered position, size, seeds and a seed
//! type rolled against the definition's probability table. Candidates
//! outside every placement region are dropped; cluster seeds expand into
//! several smaller asteroids inside their own seed scope.

use crate::config::FieldSettings;
use crate::core::types::DVec3;
use crate::core::Result;
use crate::grid::{Cell, CellCoord, clamp_cell_size};
use crate::math::Containment;
use crate::seed::{SeedStack, cell_seed};
use crate::shapes::{Cluster, PlacementShape, RegionSet};
use super::{DefinitionTable, GeneratorDefinition, ObjectSeed, ObjectSeedParams, SeedType};

/// Upper bound on sub-cells per cell edge
pub const MAX_SUBCELLS_PER_SIDE: i32 = 64;

/// Index slots reserved for the members of one cluster
pub const CLUSTER_INDEX_STRIDE: u32 = 64;

/// Produces the candidate set for a cell coordinate
pub trait CellGenerator {
    /// Edge length of the cells this generator produces
    fn cell_size(&self) -> f64;

    /// Build the cell at `coord`, or `None` when nothing can exist there.
    ///
    /// Implementations must draw randomness only inside scopes pushed on
    /// `rng` so the result depends on `coord` alone.
    fn generate_cell(&self, coord: CellCoord, rng: &mut SeedStack) -> Option<Cell>;
}

/// Density and probability-table driven asteroid placement
#[derive(Debug)]
pub struct AsteroidFieldGenerator {
    global_seed: i32,
    cell_size: f64,
    density: f64,
    regions: RegionSet,
    definition: GeneratorDefinition,
}

impl AsteroidFieldGenerator {
    pub fn new(
        global_seed: i32,
        cell_size: f64,
        density: f64,
        regions: RegionSet,
        definition: GeneratorDefinition,
    ) -> Self {
        Self {
            global_seed,
            cell_size: clamp_cell_size(cell_size),
            density: (density * definition.density).clamp(0.0, 1.0),
            regions,
            definition,
        }
    }

    /// Build from world settings, resolving the definition by version
    pub fn from_settings(settings: &FieldSettings, definitions: &DefinitionTable) -> Result<Self> {
        let definition = definitions.closest(settings.definition_version)?.clone();
        let regions = RegionSet::from_configs(&settings.regions, settings.envelope)?;
        Ok(Self::new(
            settings.global_seed,
            settings.cell_size,
            settings.density,
            regions,
            definition,
        ))
    }

    pub fn definition(&self) -> &GeneratorDefinition {
        &self.definition
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Number of sub-cells along one cell edge
    pub fn subcells_per_side(&self) -> i32 {
        if self.density <= 0.0 {
            return 0;
        }
        let spacing = (self.definition.object_size_max / self.density).max(self.definition.object_size_max);
        ((self.cell_size / spacing).floor() as i32).clamp(1, MAX_SUBCELLS_PER_SIDE)
    }

    /// Replace a cluster seed by its members. Member indices start after the
    /// sub-cell range so they never collide with lattice candidates, and
    /// members outside every region or outside the cell are dropped.
    fn expand_cluster(&self, rng: &mut SeedStack, cell: &mut Cell, parent: ObjectSeedParams, center: DVec3) {
        let params = &self.definition.cluster;
        let Ok(shape) = Cluster::new(center, params.radius) else {
            log::warn!("Invalid cluster radius {}, skipping cluster seed", params.radius);
            return;
        };

        let per_side = self.subcells_per_side() as u32;
        let first_index = per_side.pow(3) + parent.index * CLUSTER_INDEX_STRIDE;
        let cell_bounds = cell.bounds();

        let mut scope = rng.push(parent.seed);
        let count = scope.range_u32(
            params.count_min.min(CLUSTER_INDEX_STRIDE),
            params.count_max.min(CLUSTER_INDEX_STRIDE),
        );
        let r = params.radius;
        for k in 0..count {
            let offset = DVec3::new(
                scope.range_f64(-r, r),
                scope.range_f64(-r, r),
                scope.range_f64(-r, r),
            );
            let size = scope.range_f64(self.definition.object_size_min, self.definition.object_size_max)
                * params.size_scale;
            let seed = scope.next_i32();
            let generator_seed = scope.next_i32();

            let position = center + offset;
            if shape.contains(position) != Containment::Contains
                || !self.regions.contains(position)
                || !cell_bounds.contains_point(position)
            {
                continue;
            }
            cell.add_object(ObjectSeed::new(
                cell.coord(),
                ObjectSeedParams {
                    index: first_index + k,
                    seed,
                    generator_seed,
                    seed_type: SeedType::Asteroid,
                },
                position,
                size,
            ));
        }
    }
}

impl CellGenerator for AsteroidFieldGenerator {
    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn generate_cell(&self, coord: CellCoord, rng: &mut SeedStack) -> Option<Cell> {
        let per_side = self.subcells_per_side();
        if per_side == 0 || self.regions.is_empty() {
            return None;
        }

        let mut cell = Cell::new(coord, self.cell_size);
        if !self.regions.may_intersect(&cell.bounds()) {
            return None;
        }

        let spacing = self.cell_size / per_side as f64;
        let origin = cell.bounds().min;
        let def = &self.definition;

        let mut scope = rng.push(cell_seed(self.global_seed, coord));
        for z in 0..per_side {
            for y in 0..per_side {
                for x in 0..per_side {
                    let sub = CellCoord::new(x, y, z);
                    let jitter = DVec3::new(scope.next_f64(), scope.next_f64(), scope.next_f64());
                    let size = scope.range_f64(def.object_size_min, def.object_size_max);
                    let seed = scope.next_i32();
                    let generator_seed = scope.next_i32();
                    let seed_type = def.pick_seed_type(scope.next_f64());

                    if seed_type == SeedType::Empty {
                        continue;
                    }
                    let position = origin + (DVec3::new(x as f64, y as f64, z as f64) + jitter) * spacing;
                    if !self.regions.contains(position) {
                        continue;
                    }

                    let params = ObjectSeedParams {
                        index: sub.linear_index(per_side) as u32,
                        seed,
                        generator_seed,
                        seed_type,
                    };
                    match seed_type {
                        SeedType::AsteroidCluster => self.expand_cluster(&mut scope, &mut cell, params, position),
                        _ => cell.add_object(ObjectSeed::new(coord, params, position, size)),
                    }
                }
            }
        }
        drop(scope);

        log::trace!("Generated cell {:?} with {} object seeds", coord, cell.object_count());
        Some(cell)
    }
}
