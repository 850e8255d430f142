//! In-process object host and a simple blob synthesizer, used by the preview
//! binary, benches and tests.

use std::collections::{BTreeMap, HashMap};

use crate::core::types::DVec3;
use crate::core::{Error, Result};
use crate::generator::GeneratorDefinition;
use crate::math::Aabb;
use crate::seed::SeedStack;
use super::{ExistingObject, ObjectHandle, ObjectHost, PersistFlag, ShapeSynthesizer, SynthesisRequest};

/// Radius plus per-direction roughness factors
#[derive(Clone, Debug, PartialEq)]
pub struct BlobShape {
    pub radius: f64,
    pub roughness: Vec<f64>,
}

/// Deterministic blob shapes keyed by the object seeds
#[derive(Clone, Debug)]
pub struct BlobSynthesizer {
    /// Number of roughness samples per shape
    pub detail: usize,
}

impl Default for BlobSynthesizer {
    fn default() -> Self {
        Self { detail: 12 }
    }
}

impl ShapeSynthesizer for BlobSynthesizer {
    type Shape = BlobShape;

    fn synthesize(&self, request: &SynthesisRequest, definition: &GeneratorDefinition) -> BlobShape {
        let radius = request
            .size
            .max(definition.object_size_min * definition.cluster.size_scale)
            .min(definition.object_size_max)
            * 0.5;

        let mut stack = SeedStack::new(request.generator_seed);
        let mut scope = stack.push(request.seed);
        let roughness = (0..self.detail).map(|_| scope.range_f64(0.8, 1.2)).collect();
        BlobShape { radius, roughness }
    }
}

/// Object stored by [`InMemoryHost`]
#[derive(Clone, Debug)]
pub struct HostedObject {
    pub name: String,
    pub shape: BlobShape,
    pub position: DVec3,
    pub modified: bool,
    watcher: Option<PersistFlag>,
}

impl HostedObject {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extent(self.position, DVec3::splat(self.shape.radius))
    }
}

/// Host that keeps objects in maps, enforcing unique names
#[derive(Debug, Default)]
pub struct InMemoryHost {
    objects: BTreeMap<ObjectHandle, HostedObject>,
    names: HashMap<String, ObjectHandle>,
    next_handle: u64,
    failing: bool,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&HostedObject> {
        self.objects.get(&handle)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectHandle> {
        self.names.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &HostedObject)> {
        self.objects.iter().map(|(h, o)| (*h, o))
    }

    /// Simulate a player edit. Returns false for unknown handles.
    pub fn modify(&mut self, handle: ObjectHandle) -> bool {
        let Some(object) = self.objects.get_mut(&handle) else {
            return false;
        };
        if !object.modified {
            object.modified = true;
            if let Some(flag) = &object.watcher {
                flag.set();
            }
        }
        true
    }

    /// Make every following `materialize` fail
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl ObjectHost for InMemoryHost {
    type Shape = BlobShape;

    fn find_overlapping(&self, aabb: &Aabb, out: &mut Vec<ExistingObject>) {
        out.extend(
            self.objects
                .iter()
                .filter(|(_, o)| o.bounds().intersects(aabb))
                .map(|(handle, o)| ExistingObject { handle: *handle, name: o.name.clone() }),
        );
    }

    fn materialize(&mut self, name: &str, shape: BlobShape, position: DVec3) -> Result<ObjectHandle> {
        if self.failing {
            return Err(Error::Host(format!("host refused to create {}", name)));
        }
        if self.names.contains_key(name) {
            return Err(Error::Host(format!("duplicate object name {}", name)));
        }

        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.names.insert(name.to_string(), handle);
        self.objects.insert(
            handle,
            HostedObject {
                name: name.to_string(),
                shape,
                position,
                modified: false,
                watcher: None,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: ObjectHandle) {
        if let Some(object) = self.objects.remove(&handle) {
            self.names.remove(&object.name);
        }
    }

    fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    fn watch_modification(&mut self, handle: ObjectHandle, flag: PersistFlag) {
        if let Some(object) = self.objects.get_mut(&handle) {
            if object.modified {
                flag.set();
            }
            object.watcher = Some(flag);
        }
    }
}
