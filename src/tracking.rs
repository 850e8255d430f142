//! Entity tracking.
//!
//! The tracker keeps one record per entity of interest and turns entity
//! movement into load and unload requests for the cell manager. A record
//! remembers the sphere last used for marking; a new pair of requests is
//! issued only once the entity has moved farther than the threshold or its
//! radius changed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::types::DVec3;
use crate::math::{BoundingSphere, Bounds};

/// Host-side entity identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// How the tracking radius of an entity is chosen
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackedKind {
    /// Player character, tracked at the world view distance
    Player,
    /// Vehicle or other object, tracked at its own bounding radius
    Vehicle { radius: f64 },
}

/// Where tracked entities currently are
pub trait EntitySource {
    /// Current position, or `None` once the entity no longer exists
    fn position(&self, id: EntityId) -> Option<DVec3>;
}

impl<F> EntitySource for F
where
    F: Fn(EntityId) -> Option<DVec3>,
{
    fn position(&self, id: EntityId) -> Option<DVec3> {
        self(id)
    }
}

impl EntitySource for HashMap<EntityId, DVec3> {
    fn position(&self, id: EntityId) -> Option<DVec3> {
        self.get(&id).copied()
    }
}

impl EntitySource for BTreeMap<EntityId, DVec3> {
    fn position(&self, id: EntityId) -> Option<DVec3> {
        self.get(&id).copied()
    }
}

/// Request produced by [`EntityTracker::update`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackingEvent {
    Load(Bounds),
    Unload { bounds: Bounds, exclude: Option<Bounds> },
}

/// Tracking record for one entity
#[derive(Clone, Debug)]
pub struct TrackedEntity {
    pub id: EntityId,
    pub radius: f64,
    last_bounds: Option<BoundingSphere>,
}

impl TrackedEntity {
    /// Sphere used for the most recent load marking
    pub fn last_bounds(&self) -> Option<BoundingSphere> {
        self.last_bounds
    }
}

/// Registry of tracked entities
#[derive(Debug)]
pub struct EntityTracker {
    entities: BTreeMap<EntityId, TrackedEntity>,
    /// Last spheres of untracked entities awaiting an unload
    released: Vec<BoundingSphere>,
    view_distance: f64,
    threshold: f64,
}

impl EntityTracker {
    pub fn new(view_distance: f64, threshold: f64) -> Self {
        Self {
            entities: BTreeMap::new(),
            released: Vec::new(),
            view_distance,
            threshold,
        }
    }

    pub fn view_distance(&self) -> f64 {
        self.view_distance
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Start tracking `id`, or grow its radius if already tracked
    pub fn track(&mut self, id: EntityId, kind: TrackedKind) {
        let radius = match kind {
            TrackedKind::Player => self.view_distance,
            TrackedKind::Vehicle { radius } => radius,
        };
        self.entities
            .entry(id)
            .and_modify(|e| e.radius = e.radius.max(radius))
            .or_insert_with(|| {
                log::debug!("Tracking entity {:?} with radius {}", id, radius);
                TrackedEntity { id, radius, last_bounds: None }
            });
    }

    /// Stop tracking `id`. Its last sphere is unloaded on the next update.
    pub fn untrack(&mut self, id: EntityId) -> bool {
        match self.entities.remove(&id) {
            Some(entity) => {
                self.released.extend(entity.last_bounds);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.values()
    }

    /// Compare every entity against its last marked sphere and append the
    /// resulting requests to `events`. Entities the source no longer knows
    /// are dropped with an unconditional unload.
    ///
    /// Whenever an unload is issued, stationary entities re-assert their
    /// spheres so cells they still cover win the load/unload tie-break.
    pub fn update(&mut self, source: &impl EntitySource, events: &mut Vec<TrackingEvent>) {
        let mut unloading = !self.released.is_empty();
        for sphere in self.released.drain(..) {
            events.push(TrackingEvent::Unload { bounds: sphere.into(), exclude: None });
        }

        let threshold = self.threshold;
        let mut stationary = Vec::new();
        self.entities.retain(|id, entity| {
            let Some(position) = source.position(*id) else {
                log::debug!("Entity {:?} is gone, releasing its cells", id);
                if let Some(last) = entity.last_bounds {
                    events.push(TrackingEvent::Unload { bounds: last.into(), exclude: None });
                    unloading = true;
                }
                return false;
            };

            let current = BoundingSphere::new(position, entity.radius);
            match entity.last_bounds {
                None => {
                    events.push(TrackingEvent::Load(current.into()));
                    entity.last_bounds = Some(current);
                }
                Some(last) if last.center.distance(position) > threshold || last.radius != entity.radius => {
                    events.push(TrackingEvent::Load(current.into()));
                    events.push(TrackingEvent::Unload {
                        bounds: last.into(),
                        exclude: Some(current.into()),
                    });
                    entity.last_bounds = Some(current);
                    unloading = true;
                }
                Some(last) => stationary.push(last),
            }
            true
        });

        if unloading {
            events.extend(stationary.into_iter().map(|s| TrackingEvent::Load(s.into())));
        }
    }
}
