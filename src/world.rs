//! Per-world generation session

use crate::bridge::{MaterializationBridge, ObjectHost, ShapeSynthesizer};
use crate::config::FieldSettings;
use crate::core::Result;
use crate::generator::{AsteroidFieldGenerator, DefinitionTable};
use crate::lifecycle::CellManager;
use crate::tracking::{EntityId, EntitySource, EntityTracker, TrackedKind, TrackingEvent};

/// Counters for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub cells_loaded: usize,
    pub cells_unloaded: usize,
    pub objects_materialized: usize,
    /// Loaded cells after the tick
    pub loaded_cells: usize,
}

/// Tracker, cell manager and bridge for one world, driven once per step
pub struct ProceduralWorld<S, H> {
    settings: FieldSettings,
    tracker: EntityTracker,
    manager: CellManager,
    bridge: MaterializationBridge<S, H>,
    events: Vec<TrackingEvent>,
}

impl<S, H> ProceduralWorld<S, H>
where
    S: ShapeSynthesizer,
    H: ObjectHost<Shape = S::Shape>,
{
    pub fn new(settings: FieldSettings, definitions: &DefinitionTable, synthesizer: S, host: H) -> Result<Self> {
        settings.validate()?;
        let generator = AsteroidFieldGenerator::from_settings(&settings, definitions)?;
        let bridge = MaterializationBridge::new(synthesizer, host, generator.definition().clone());
        let tracker = EntityTracker::new(settings.view_distance, settings.move_threshold());

        log::info!(
            "Procedural world: seed {}, cell size {}, {} regions, {} sub-cells per side",
            settings.global_seed,
            settings.effective_cell_size(),
            generator.regions().len(),
            generator.subcells_per_side(),
        );

        let manager = CellManager::new(Box::new(generator), settings.global_seed);
        Ok(Self {
            settings,
            tracker,
            manager,
            bridge,
            events: Vec::new(),
        })
    }

    pub fn track(&mut self, id: EntityId, kind: TrackedKind) {
        self.tracker.track(id, kind);
    }

    pub fn untrack(&mut self, id: EntityId) -> bool {
        self.tracker.untrack(id)
    }

    /// Run one full pass: collect marks, load, unload, then materialize.
    pub fn tick(&mut self, source: &impl EntitySource) -> TickStats {
        self.events.clear();
        self.tracker.update(source, &mut self.events);
        for event in &self.events {
            match event {
                TrackingEvent::Load(bounds) => self.manager.mark_to_load(bounds),
                TrackingEvent::Unload { bounds, exclude } => self.manager.mark_to_unload(bounds, exclude.as_ref()),
            }
        }

        let cells_loaded = self.manager.load_pending_cells();
        let cells_unloaded = self.manager.unload_pending_cells(&mut self.bridge);
        let objects_materialized = self.manager.generate_loaded_cell_objects(&mut self.bridge);

        TickStats {
            cells_loaded,
            cells_unloaded,
            objects_materialized,
            loaded_cells: self.manager.loaded_count(),
        }
    }

    /// Re-check every loaded object on the next tick. Call after the host
    /// removed objects on its own.
    pub fn revalidate_objects(&mut self) {
        self.manager.revalidate_objects();
    }

    /// Unload every cell, destroying unmodified objects
    pub fn shutdown(&mut self) -> usize {
        let unloaded = self.manager.unload_all(&mut self.bridge);
        log::info!("Procedural world shut down, {} cells unloaded", unloaded);
        unloaded
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &EntityTracker {
        &self.tracker
    }

    pub fn manager(&self) -> &CellManager {
        &self.manager
    }

    pub fn bridge(&self) -> &MaterializationBridge<S, H> {
        &self.bridge
    }

    pub fn host(&self) -> &H {
        self.bridge.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.bridge.host_mut()
    }
}
