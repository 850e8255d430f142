//! Bridge between object seeds and the host that owns heavy objects.
//!
//! The bridge names every seed deterministically, asks the host whether an
//! object with that name already exists near the seed, and otherwise
//! synthesizes a shape and hands it to the host. Materialized objects carry a
//! [`PersistFlag`] that the host raises once the object is modified; closing
//! an object destroys it only while that flag is clear.

pub mod memory;

pub use memory::{BlobShape, BlobSynthesizer, InMemoryHost};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::types::DVec3;
use crate::core::Result;
use crate::generator::{GeneratorDefinition, ObjectSeed, SeedType};
use crate::math::Aabb;

/// Host-side identifier of a materialized object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

/// Shared "do not discard" marker, raised by the host on first modification
#[derive(Clone, Debug, Default)]
pub struct PersistFlag(Arc<AtomicBool>);

impl PersistFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Back-reference stored on a generated seed
#[derive(Clone, Debug)]
pub struct Materialized {
    pub handle: ObjectHandle,
    pub persist: PersistFlag,
}

/// Object reported by [`ObjectHost::find_overlapping`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExistingObject {
    pub handle: ObjectHandle,
    pub name: String,
}

/// Inputs for shape synthesis, taken from one object seed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthesisRequest {
    pub seed: i32,
    pub generator_seed: i32,
    pub size: f64,
    pub seed_type: SeedType,
}

impl From<&ObjectSeed> for SynthesisRequest {
    fn from(seed: &ObjectSeed) -> Self {
        Self {
            seed: seed.params.seed,
            generator_seed: seed.params.generator_seed,
            size: seed.size,
            seed_type: seed.params.seed_type,
        }
    }
}

/// Builds the shape of an object from its seed
pub trait ShapeSynthesizer {
    type Shape;

    fn synthesize(&self, request: &SynthesisRequest, definition: &GeneratorDefinition) -> Self::Shape;
}

/// External world that owns materialized objects
pub trait ObjectHost {
    type Shape;

    /// Append every object whose bounds overlap `aabb` to `out`
    fn find_overlapping(&self, aabb: &Aabb, out: &mut Vec<ExistingObject>);

    /// Create a named object at `position`
    fn materialize(&mut self, name: &str, shape: Self::Shape, position: DVec3) -> Result<ObjectHandle>;

    fn destroy(&mut self, handle: ObjectHandle);

    fn is_alive(&self, handle: ObjectHandle) -> bool;

    /// Raise `flag` the first time the object is structurally modified
    fn watch_modification(&mut self, handle: ObjectHandle, flag: PersistFlag);
}

/// Result of [`MaterializationBridge::generate_object`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// Seed already had a live object
    Present,
    /// A new object was synthesized and created
    Created,
    /// An object with the seed's name already existed and was taken over
    Adopted,
    /// The host refused; the seed stays ungenerated
    Failed,
}

/// Running totals of bridge activity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub created: usize,
    pub adopted: usize,
    pub destroyed: usize,
    pub kept: usize,
    pub failed: usize,
}

/// Creates and disposes host objects for object seeds
pub struct MaterializationBridge<S, H> {
    synthesizer: S,
    host: H,
    definition: GeneratorDefinition,
    existing: Vec<ExistingObject>,
    stats: BridgeStats,
}

impl<S, H> MaterializationBridge<S, H>
where
    S: ShapeSynthesizer,
    H: ObjectHost<Shape = S::Shape>,
{
    pub fn new(synthesizer: S, host: H, definition: GeneratorDefinition) -> Self {
        Self {
            synthesizer,
            host,
            definition,
            existing: Vec::new(),
            stats: BridgeStats::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    pub fn definition(&self) -> &GeneratorDefinition {
        &self.definition
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Make sure the host holds an object for `seed`.
    ///
    /// A generated seed whose object is gone from the host is reset and
    /// materialized again.
    pub fn generate_object(&mut self, seed: &mut ObjectSeed) -> MaterializeOutcome {
        if seed.generated {
            match &seed.user_data {
                Some(existing) if self.host.is_alive(existing.handle) => return MaterializeOutcome::Present,
                _ => {
                    log::warn!("Object for {} vanished from host, regenerating", seed.name());
                    seed.generated = false;
                    seed.user_data = None;
                }
            }
        }

        let name = seed.name();

        self.existing.clear();
        self.host.find_overlapping(&seed.bounding_box(), &mut self.existing);
        if let Some(found) = self.existing.iter().find(|o| o.name == name) {
            // Survived an earlier unload, so it was modified
            let persist = PersistFlag::new();
            persist.set();
            seed.user_data = Some(Materialized { handle: found.handle, persist });
            seed.generated = true;
            self.stats.adopted += 1;
            log::debug!("Adopted existing object {}", name);
            return MaterializeOutcome::Adopted;
        }

        let shape = self
            .synthesizer
            .synthesize(&SynthesisRequest::from(&*seed), &self.definition);
        match self.host.materialize(&name, shape, seed.position) {
            Ok(handle) => {
                let persist = PersistFlag::new();
                self.host.watch_modification(handle, persist.clone());
                seed.user_data = Some(Materialized { handle, persist });
                seed.generated = true;
                self.stats.created += 1;
                log::trace!("Materialized {} at {:?}", name, seed.position);
                MaterializeOutcome::Created
            }
            Err(err) => {
                log::warn!("Failed to materialize {}: {}", name, err);
                self.stats.failed += 1;
                MaterializeOutcome::Failed
            }
        }
    }

    /// Release the object behind `seed`, keeping it in the host if modified
    pub fn close_object(&mut self, seed: &mut ObjectSeed) {
        if !seed.generated {
            return;
        }
        seed.generated = false;
        let Some(materialized) = seed.user_data.take() else {
            return;
        };

        if materialized.persist.is_set() {
            log::debug!("Keeping modified object {}", seed.name());
            self.stats.kept += 1;
        } else if self.host.is_alive(materialized.handle) {
            self.host.destroy(materialized.handle);
            self.stats.destroyed += 1;
        }
    }
}
