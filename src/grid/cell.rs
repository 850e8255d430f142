//! A loaded cell of the generation grid and the candidate objects inside it

use crate::generator::ObjectSeed;
use crate::math::{Aabb, Bounds};
use super::coord::CellCoord;
use super::tree::{DynamicAabbTree, ProxyId};

/// Cubic region of the generation grid together with its object seeds.
///
/// Identity (`coord`, `bounds`) is fixed at construction; the seed list is
/// appended to during generation and the per-seed generated state changes
/// while the cell is loaded.
#[derive(Debug)]
pub struct Cell {
    coord: CellCoord,
    bounds: Aabb,
    /// Proxy in the loaded-cell tree, set while the cell is indexed
    proxy: Option<ProxyId>,
    objects: Vec<ObjectSeed>,
    /// Index over `objects` by each seed's bounding box
    object_tree: DynamicAabbTree<usize>,
    /// Every seed had a live object at the end of the last materialization pass
    materialized: bool,
}

impl Cell {
    pub fn new(coord: CellCoord, cell_size: f64) -> Self {
        Self {
            coord,
            bounds: coord.bounds(cell_size),
            proxy: None,
            objects: Vec::new(),
            object_tree: DynamicAabbTree::new(),
            materialized: false,
        }
    }

    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn proxy(&self) -> Option<ProxyId> {
        self.proxy
    }

    pub(crate) fn set_proxy(&mut self, proxy: Option<ProxyId>) {
        self.proxy = proxy;
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub(crate) fn set_materialized(&mut self, materialized: bool) {
        self.materialized = materialized;
    }

    /// Add a candidate object and index it
    pub fn add_object(&mut self, seed: ObjectSeed) {
        self.materialized = false;
        let index = self.objects.len();
        self.object_tree.insert(seed.bounding_box(), index);
        self.objects.push(seed);
    }

    pub fn objects(&self) -> &[ObjectSeed] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [ObjectSeed] {
        &mut self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of seeds currently materialized
    pub fn generated_count(&self) -> usize {
        self.objects.iter().filter(|o| o.generated).count()
    }

    /// Indices of the seeds whose boxes overlap `bounds`
    pub fn overlap_all(&self, bounds: &Bounds, out: &mut Vec<usize>, clear: bool) {
        self.object_tree.query(bounds, out, clear);
    }

    /// Visit the seeds whose boxes overlap `bounds`
    pub fn for_each_overlapping<'a, F>(&'a self, bounds: &Bounds, mut visit: F)
    where
        F: FnMut(&'a ObjectSeed),
    {
        self.object_tree
            .for_each_overlapping(bounds, |_, &index| visit(&self.objects[index]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DVec3;
    use crate::generator::{ObjectSeedParams, SeedType};
    use crate::math::BoundingSphere;

    fn seed_at(coord: CellCoord, index: u32, pos: DVec3) -> ObjectSeed {
        ObjectSeed::new(
            coord,
            ObjectSeedParams {
                index,
                seed: index as i32 * 31,
                generator_seed: 0,
                seed_type: SeedType::Asteroid,
            },
            pos,
            64.0,
        )
    }

    #[test]
    fn test_cell_bounds() {
        let cell = Cell::new(CellCoord::new(0, 1, 0), 1000.0);
        assert_eq!(cell.bounds().min, DVec3::new(0.0, 1000.0, 0.0));
        assert!(cell.is_empty());
        assert!(cell.proxy().is_none());
    }

    #[test]
    fn test_overlap_queries() {
        let coord = CellCoord::new(0, 0, 0);
        let mut cell = Cell::new(coord, 1000.0);
        cell.add_object(seed_at(coord, 0, DVec3::splat(100.0)));
        cell.add_object(seed_at(coord, 1, DVec3::splat(900.0)));
        assert_eq!(cell.object_count(), 2);

        let near_origin = Bounds::Sphere(BoundingSphere::new(DVec3::ZERO, 200.0));
        let mut hits = Vec::new();
        cell.overlap_all(&near_origin, &mut hits, true);
        assert_eq!(hits, vec![0]);

        let mut names = Vec::new();
        cell.for_each_overlapping(&Bounds::Box(cell.bounds()), |o| names.push(o.params.index));
        names.sort();
        assert_eq!(names, vec![0, 1]);
    }
}
