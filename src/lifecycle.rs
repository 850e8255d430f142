//! Cell lifecycle management.
//!
//! Every cell coordinate moves through `unseen -> pending load -> loaded ->
//! pending unload -> unseen`. Marks are collected first; loading and
//! unloading then run as separate passes. A coordinate marked for both in
//! the same round stays loaded.

use std::collections::{BTreeSet, HashMap};

use crate::bridge::{MaterializationBridge, MaterializeOutcome, ObjectHost, ShapeSynthesizer};
use crate::generator::{CellGenerator, ObjectSeed};
use crate::grid::{Cell, CellCoord, DynamicAabbTree, cell_range, iter_range};
use crate::math::{Bounds, Containment};
use crate::seed::SeedStack;

/// Where a cell coordinate is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    Unseen,
    PendingLoad,
    Loaded,
    PendingUnload,
}

/// Owns the loaded cells, their index and the pending sets
pub struct CellManager {
    generator: Box<dyn CellGenerator>,
    rng: SeedStack,
    cells: HashMap<CellCoord, Cell>,
    cell_tree: DynamicAabbTree<CellCoord>,
    pending_load: BTreeSet<CellCoord>,
    pending_unload: BTreeSet<CellCoord>,
    scratch: Vec<CellCoord>,
}

impl CellManager {
    pub fn new(generator: Box<dyn CellGenerator>, global_seed: i32) -> Self {
        Self {
            generator,
            rng: SeedStack::new(global_seed),
            cells: HashMap::new(),
            cell_tree: DynamicAabbTree::new(),
            pending_load: BTreeSet::new(),
            pending_unload: BTreeSet::new(),
            scratch: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.generator.cell_size()
    }

    /// Queue every cell touching `bounds` for loading
    pub fn mark_to_load(&mut self, bounds: &Bounds) {
        let size = self.cell_size();
        let (min, max) = cell_range(&bounds.aabb(), size);
        for coord in iter_range(min, max) {
            if bounds.intersects_aabb(&coord.bounds(size)) {
                self.pending_load.insert(coord);
            }
        }
    }

    /// Queue loaded cells touching `bounds` for unloading, skipping any cell
    /// that lies entirely inside `exclude`
    pub fn mark_to_unload(&mut self, bounds: &Bounds, exclude: Option<&Bounds>) {
        let size = self.cell_size();
        self.cell_tree.query(bounds, &mut self.scratch, true);
        for coord in &self.scratch {
            if let Some(exclude) = exclude {
                if exclude.contains_aabb(&coord.bounds(size)) == Containment::Contains {
                    continue;
                }
            }
            self.pending_unload.insert(*coord);
        }
    }

    /// Drop pending unloads that are also pending loads
    pub fn resolve_conflicts(&mut self) {
        let pending_load = &self.pending_load;
        self.pending_unload.retain(|coord| !pending_load.contains(coord));
    }

    /// Generate and index every pending cell that is not loaded yet.
    /// Returns the number of cells added.
    pub fn load_pending_cells(&mut self) -> usize {
        self.resolve_conflicts();

        let mut loaded = 0;
        for coord in std::mem::take(&mut self.pending_load) {
            if self.cells.contains_key(&coord) {
                continue;
            }
            let Some(mut cell) = self.generator.generate_cell(coord, &mut self.rng) else {
                log::trace!("No cell generated at {:?}", coord);
                continue;
            };
            let proxy = self.cell_tree.insert(cell.bounds(), coord);
            cell.set_proxy(Some(proxy));
            self.cells.insert(coord, cell);
            loaded += 1;
        }

        if loaded > 0 {
            log::debug!("Loaded {} cells ({} total)", loaded, self.cells.len());
        }
        loaded
    }

    /// Close the objects of every pending cell and drop the cells.
    /// Returns the number of cells removed.
    pub fn unload_pending_cells<S, H>(&mut self, bridge: &mut MaterializationBridge<S, H>) -> usize
    where
        S: ShapeSynthesizer,
        H: ObjectHost<Shape = S::Shape>,
    {
        let mut unloaded = 0;
        for coord in std::mem::take(&mut self.pending_unload) {
            let Some(mut cell) = self.cells.remove(&coord) else {
                continue;
            };
            for seed in cell.objects_mut().iter_mut().filter(|s| s.generated) {
                bridge.close_object(seed);
            }
            if let Some(proxy) = cell.proxy() {
                self.cell_tree.remove(proxy);
            }
            unloaded += 1;
        }

        if unloaded > 0 {
            log::debug!("Unloaded {} cells ({} remaining)", unloaded, self.cells.len());
        }
        unloaded
    }

    /// Materialize every object seed of the loaded cells that has no live
    /// object yet. Returns the number of objects created or adopted.
    ///
    /// Cells fully materialized by an earlier pass are skipped until
    /// [`CellManager::revalidate_objects`] is called.
    pub fn generate_loaded_cell_objects<S, H>(&mut self, bridge: &mut MaterializationBridge<S, H>) -> usize
    where
        S: ShapeSynthesizer,
        H: ObjectHost<Shape = S::Shape>,
    {
        self.scratch.clear();
        self.scratch.extend(
            self.cells
                .iter()
                .filter(|(_, cell)| !cell.is_materialized())
                .map(|(coord, _)| *coord),
        );
        self.scratch.sort_unstable();

        let mut materialized = 0;
        for coord in &self.scratch {
            let Some(cell) = self.cells.get_mut(coord) else { continue };
            let mut complete = true;
            for seed in cell.objects_mut() {
                match bridge.generate_object(seed) {
                    MaterializeOutcome::Created | MaterializeOutcome::Adopted => materialized += 1,
                    MaterializeOutcome::Present => {}
                    MaterializeOutcome::Failed => complete = false,
                }
            }
            cell.set_materialized(complete);
        }
        materialized
    }

    /// Make the next materialization pass re-check every loaded cell, so
    /// objects the host removed on its own are recreated
    pub fn revalidate_objects(&mut self) {
        for cell in self.cells.values_mut() {
            cell.set_materialized(false);
        }
    }

    /// Mark and unload every loaded cell
    pub fn unload_all<S, H>(&mut self, bridge: &mut MaterializationBridge<S, H>) -> usize
    where
        S: ShapeSynthesizer,
        H: ObjectHost<Shape = S::Shape>,
    {
        self.pending_load.clear();
        self.pending_unload.extend(self.cells.keys().copied());
        self.unload_pending_cells(bridge)
    }

    pub fn cell_state(&self, coord: CellCoord) -> CellState {
        if self.cells.contains_key(&coord) {
            if self.pending_unload.contains(&coord) {
                CellState::PendingUnload
            } else {
                CellState::Loaded
            }
        } else if self.pending_load.contains(&coord) {
            CellState::PendingLoad
        } else {
            CellState::Unseen
        }
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.cells.len()
    }

    pub fn pending_load_count(&self) -> usize {
        self.pending_load.len()
    }

    pub fn pending_unload_count(&self) -> usize {
        self.pending_unload.len()
    }

    pub fn loaded_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Total object seeds with a live object across loaded cells
    pub fn generated_object_count(&self) -> usize {
        self.cells.values().map(Cell::generated_count).sum()
    }

    /// Loaded cells overlapping `bounds`
    pub fn overlapping_cells(&self, bounds: &Bounds, out: &mut Vec<CellCoord>, clear: bool) {
        self.cell_tree.query(bounds, out, clear);
    }

    /// Object seeds of loaded cells whose boxes overlap `bounds`
    pub fn objects_in<'a>(&'a self, bounds: &Bounds, out: &mut Vec<&'a ObjectSeed>, clear: bool) {
        if clear {
            out.clear();
        }
        let cells = &self.cells;
        self.cell_tree.for_each_overlapping(bounds, |_, coord| {
            if let Some(cell) = cells.get(coord) {
                cell.for_each_overlapping(bounds, |seed| out.push(seed));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BlobSynthesizer, InMemoryHost};
    use crate::core::types::DVec3;
    use crate::generator::{GeneratorDefinition, ObjectSeedParams, SeedType};
    use crate::math::{Aabb, BoundingSphere};

    const SIZE: f64 = 1000.0;

    /// One rock in the middle of every cell on the y = 0 layer
    struct LayerGenerator;

    impl CellGenerator for LayerGenerator {
        fn cell_size(&self) -> f64 {
            SIZE
        }

        fn generate_cell(&self, coord: CellCoord, rng: &mut SeedStack) -> Option<Cell> {
            if coord.y != 0 {
                return None;
            }
            let mut cell = Cell::new(coord, SIZE);
            let mut scope = rng.push(crate::seed::cell_seed(0, coord));
            let params = ObjectSeedParams {
                index: 0,
                seed: scope.next_i32(),
                generator_seed: scope.next_i32(),
                seed_type: SeedType::Asteroid,
            };
            cell.add_object(ObjectSeed::new(coord, params, cell.bounds().center(), 100.0));
            Some(cell)
        }
    }

    type TestBridge = MaterializationBridge<BlobSynthesizer, InMemoryHost>;

    fn setup() -> (CellManager, TestBridge) {
        let manager = CellManager::new(Box::new(LayerGenerator), 0);
        let bridge = MaterializationBridge::new(
            BlobSynthesizer::default(),
            InMemoryHost::new(),
            GeneratorDefinition::default(),
        );
        (manager, bridge)
    }

    fn cell_box(x: i32, z: i32) -> Bounds {
        Bounds::Box(CellCoord::new(x, 0, z).bounds(SIZE).inflated(-1.0))
    }

    #[test]
    fn test_load_states() {
        let (mut manager, _) = setup();
        let origin = CellCoord::new(0, 0, 0);
        assert_eq!(manager.cell_state(origin), CellState::Unseen);

        manager.mark_to_load(&Bounds::Sphere(BoundingSphere::new(DVec3::splat(500.0), 100.0)));
        assert_eq!(manager.cell_state(origin), CellState::PendingLoad);

        assert_eq!(manager.load_pending_cells(), 1);
        assert_eq!(manager.cell_state(origin), CellState::Loaded);
        assert_eq!(manager.pending_load_count(), 0);
        assert!(manager.cell(origin).unwrap().proxy().is_some());
    }

    #[test]
    fn test_no_cell_stays_unseen() {
        let (mut manager, _) = setup();
        let above = CellCoord::new(0, 3, 0);
        manager.mark_to_load(&Bounds::Box(above.bounds(SIZE).inflated(-1.0)));
        assert_eq!(manager.load_pending_cells(), 0);
        assert_eq!(manager.cell_state(above), CellState::Unseen);
    }

    #[test]
    fn test_touching_sphere_loads_neighbor() {
        let (mut manager, _) = setup();
        // Touches the x = 1000 face exactly
        manager.mark_to_load(&Bounds::Sphere(BoundingSphere::new(DVec3::new(900.0, 500.0, 500.0), 100.0)));
        manager.load_pending_cells();
        assert_eq!(manager.cell_state(CellCoord::new(1, 0, 0)), CellState::Loaded);
        assert_eq!(manager.cell_state(CellCoord::new(0, 0, 0)), CellState::Loaded);
    }

    #[test]
    fn test_materialization_idempotent() {
        let (mut manager, mut bridge) = setup();
        manager.mark_to_load(&Bounds::Box(Aabb::new(DVec3::splat(1.0), DVec3::new(2999.0, 999.0, 1999.0))));
        assert_eq!(manager.load_pending_cells(), 6);

        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 6);
        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 0);
        assert_eq!(bridge.host().len(), 6);
        assert_eq!(manager.generated_object_count(), 6);
    }

    #[test]
    fn test_materialized_cells_skipped_until_revalidated() {
        let (mut manager, mut bridge) = setup();
        let origin = CellCoord::new(0, 0, 0);
        manager.mark_to_load(&cell_box(0, 0));
        manager.mark_to_load(&cell_box(1, 0));
        manager.load_pending_cells();
        assert!(!manager.cell(origin).unwrap().is_materialized());

        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 2);
        assert!(manager.cell(origin).unwrap().is_materialized());

        // Host drops an object behind our back; steady-state passes skip the cell
        let handle = manager.cell(origin).unwrap().objects()[0].user_data.as_ref().unwrap().handle;
        bridge.host_mut().destroy(handle);
        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 0);

        manager.revalidate_objects();
        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 1);
        assert_eq!(bridge.host().len(), 2);
    }

    #[test]
    fn test_failed_cells_retried() {
        let (mut manager, mut bridge) = setup();
        let origin = CellCoord::new(0, 0, 0);
        manager.mark_to_load(&cell_box(0, 0));
        manager.load_pending_cells();

        bridge.host_mut().set_failing(true);
        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 0);
        assert!(!manager.cell(origin).unwrap().is_materialized());

        bridge.host_mut().set_failing(false);
        assert_eq!(manager.generate_loaded_cell_objects(&mut bridge), 1);
        assert!(manager.cell(origin).unwrap().is_materialized());
    }

    #[test]
    fn test_unload_keeps_modified_objects() {
        let (mut manager, mut bridge) = setup();
        let a = CellCoord::new(0, 0, 0);
        let b = CellCoord::new(1, 0, 0);
        manager.mark_to_load(&cell_box(0, 0));
        manager.mark_to_load(&cell_box(1, 0));
        manager.load_pending_cells();
        manager.generate_loaded_cell_objects(&mut bridge);

        let kept = manager.cell(a).unwrap().objects()[0].user_data.as_ref().unwrap().handle;
        let kept_name = manager.cell(a).unwrap().objects()[0].name();
        let dropped_name = manager.cell(b).unwrap().objects()[0].name();
        bridge.host_mut().modify(kept);

        manager.mark_to_unload(&cell_box(0, 0), None);
        manager.mark_to_unload(&cell_box(1, 0), None);
        assert_eq!(manager.cell_state(a), CellState::PendingUnload);
        assert_eq!(manager.unload_pending_cells(&mut bridge), 2);
        assert_eq!(manager.loaded_count(), 0);
        assert_eq!(manager.cell_state(a), CellState::Unseen);
        assert_eq!(manager.cell_state(b), CellState::Unseen);
        assert_eq!(bridge.host().len(), 1);
        assert!(bridge.host().is_alive(kept));

        // Reload: the modified object is adopted, the other regenerated
        manager.mark_to_load(&cell_box(0, 0));
        manager.mark_to_load(&cell_box(1, 0));
        manager.load_pending_cells();
        manager.generate_loaded_cell_objects(&mut bridge);

        assert_eq!(bridge.host().len(), 2);
        assert_eq!(bridge.host().find_by_name(&kept_name), Some(kept));
        assert!(bridge.host().find_by_name(&dropped_name).is_some());
        assert_eq!(bridge.stats().adopted, 1);
    }

    #[test]
    fn test_load_wins_over_unload() {
        let (mut manager, mut bridge) = setup();
        let origin = CellCoord::new(0, 0, 0);
        manager.mark_to_load(&cell_box(0, 0));
        manager.load_pending_cells();
        manager.generate_loaded_cell_objects(&mut bridge);

        manager.mark_to_unload(&cell_box(0, 0), None);
        manager.mark_to_load(&cell_box(0, 0));
        manager.load_pending_cells();
        assert_eq!(manager.pending_unload_count(), 0);
        assert_eq!(manager.unload_pending_cells(&mut bridge), 0);
        assert_eq!(manager.cell_state(origin), CellState::Loaded);
        assert_eq!(bridge.host().len(), 1);
    }

    #[test]
    fn test_unload_skips_fully_excluded_cells() {
        let (mut manager, _) = setup();
        let everything = Bounds::Box(Aabb::new(DVec3::splat(1.0), DVec3::new(2999.0, 999.0, 999.0)));
        manager.mark_to_load(&everything);
        assert_eq!(manager.load_pending_cells(), 3);

        let exclude = Bounds::Box(Aabb::new(DVec3::new(-1.0, -1.0, -1.0), DVec3::new(1001.0, 1001.0, 1001.0)));
        manager.mark_to_unload(&everything, Some(&exclude));
        assert_eq!(manager.cell_state(CellCoord::new(0, 0, 0)), CellState::Loaded);
        assert_eq!(manager.cell_state(CellCoord::new(1, 0, 0)), CellState::PendingUnload);
        assert_eq!(manager.cell_state(CellCoord::new(2, 0, 0)), CellState::PendingUnload);
    }

    #[test]
    fn test_unload_ignores_unloaded_cells() {
        let (mut manager, mut bridge) = setup();
        manager.mark_to_unload(&cell_box(5, 5), None);
        assert_eq!(manager.pending_unload_count(), 0);
        assert_eq!(manager.unload_pending_cells(&mut bridge), 0);
    }

    #[test]
    fn test_queries() {
        let (mut manager, mut bridge) = setup();
        manager.mark_to_load(&Bounds::Box(Aabb::new(DVec3::splat(1.0), DVec3::new(2999.0, 999.0, 999.0))));
        manager.load_pending_cells();
        manager.generate_loaded_cell_objects(&mut bridge);

        let probe = Bounds::Sphere(BoundingSphere::new(DVec3::new(1500.0, 500.0, 500.0), 100.0));
        let mut coords = vec![CellCoord::new(9, 9, 9)];
        manager.overlapping_cells(&probe, &mut coords, true);
        assert_eq!(coords, vec![CellCoord::new(1, 0, 0)]);

        let mut objects = Vec::new();
        manager.objects_in(&probe, &mut objects, true);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].cell, CellCoord::new(1, 0, 0));
        assert!(objects[0].generated);
    }

    #[test]
    fn test_unload_all() {
        let (mut manager, mut bridge) = setup();
        manager.mark_to_load(&Bounds::Box(Aabb::new(DVec3::splat(1.0), DVec3::new(2999.0, 999.0, 999.0))));
        manager.load_pending_cells();
        manager.generate_loaded_cell_objects(&mut bridge);

        assert_eq!(manager.unload_all(&mut bridge), 3);
        assert!(bridge.host().is_empty());
        assert_eq!(manager.generated_object_count(), 0);
    }
}
