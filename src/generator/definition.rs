//! Generator definitions and version lookup

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use super::SeedType;

/// Parameters for expanding a cluster seed into individual asteroids
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Radius around the cluster seed in which members are placed
    pub radius: f64,
    pub count_min: u32,
    pub count_max: u32,
    /// Scale applied to member sizes
    pub size_scale: f64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            radius: 600.0,
            count_min: 3,
            count_max: 8,
            size_scale: 0.5,
        }
    }
}

/// One entry of the seed-type probability table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedTypeWeight {
    pub seed_type: SeedType,
    pub weight: f64,
}

/// Read-only generation parameters for one world-settings version
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorDefinition {
    pub version: u32,
    pub object_size_min: f64,
    pub object_size_max: f64,
    /// Base density in `(0, 1]`, multiplied with the world's density setting
    pub density: f64,
    #[serde(default)]
    pub cluster: ClusterParams,
    /// Weighted seed-type table; an empty table yields only asteroids
    #[serde(default)]
    pub seed_types: Vec<SeedTypeWeight>,
}

impl Default for GeneratorDefinition {
    fn default() -> Self {
        Self {
            version: 1,
            object_size_min: 64.0,
            object_size_max: 512.0,
            density: 1.0,
            cluster: ClusterParams::default(),
            seed_types: vec![
                SeedTypeWeight { seed_type: SeedType::Asteroid, weight: 0.85 },
                SeedTypeWeight { seed_type: SeedType::AsteroidCluster, weight: 0.05 },
                SeedTypeWeight { seed_type: SeedType::Empty, weight: 0.10 },
            ],
        }
    }
}

impl GeneratorDefinition {
    /// Map a uniform roll in `[0, 1)` to a seed type through the weight table
    pub fn pick_seed_type(&self, roll: f64) -> SeedType {
        let total: f64 = self.seed_types.iter().map(|w| w.weight.max(0.0)).sum();
        if total <= 0.0 {
            return SeedType::Asteroid;
        }
        let mut remaining = roll * total;
        for entry in &self.seed_types {
            let w = entry.weight.max(0.0);
            if remaining < w {
                return entry.seed_type;
            }
            remaining -= w;
        }
        self.seed_types
            .iter()
            .rev()
            .find(|w| w.weight > 0.0)
            .map_or(SeedType::Asteroid, |w| w.seed_type)
    }
}

/// Definitions keyed by version
#[derive(Clone, Debug, Default)]
pub struct DefinitionTable {
    definitions: BTreeMap<u32, GeneratorDefinition>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of definitions
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<GeneratorDefinition> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for def in definitions {
            table.insert(def);
        }
        Ok(table)
    }

    /// Insert or replace the definition for its version
    pub fn insert(&mut self, definition: GeneratorDefinition) {
        self.definitions.insert(definition.version, definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definition for `version`.
    ///
    /// Without an exact match, the highest version not exceeding `version`
    /// is used; if every version is newer, the lowest one is used.
    pub fn closest(&self, version: u32) -> Result<&GeneratorDefinition> {
        if let Some(def) = self.definitions.get(&version) {
            return Ok(def);
        }
        let fallback = self
            .definitions
            .range(..=version)
            .next_back()
            .or_else(|| self.definitions.iter().next())
            .map(|(_, def)| def)
            .ok_or(Error::NoDefinition)?;
        log::warn!(
            "No generator definition for version {}, falling back to version {}",
            version, fallback.version
        );
        Ok(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(versions: &[u32]) -> DefinitionTable {
        let mut t = DefinitionTable::new();
        for &v in versions {
            t.insert(GeneratorDefinition { version: v, ..Default::default() });
        }
        t
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(table(&[1, 3, 5]).closest(3).unwrap().version, 3);
    }

    #[test]
    fn test_fallback_highest_not_exceeding() {
        assert_eq!(table(&[1, 3, 5]).closest(4).unwrap().version, 3);
        assert_eq!(table(&[1, 3, 5]).closest(100).unwrap().version, 5);
    }

    #[test]
    fn test_fallback_lowest_when_all_newer() {
        assert_eq!(table(&[4, 7]).closest(2).unwrap().version, 4);
    }

    #[test]
    fn test_empty_table() {
        assert!(matches!(DefinitionTable::new().closest(1), Err(Error::NoDefinition)));
    }

    #[test]
    fn test_pick_seed_type() {
        let def = GeneratorDefinition {
            seed_types: vec![
                SeedTypeWeight { seed_type: SeedType::Asteroid, weight: 3.0 },
                SeedTypeWeight { seed_type: SeedType::AsteroidCluster, weight: 1.0 },
            ],
            ..Default::default()
        };
        assert_eq!(def.pick_seed_type(0.0), SeedType::Asteroid);
        assert_eq!(def.pick_seed_type(0.74), SeedType::Asteroid);
        assert_eq!(def.pick_seed_type(0.76), SeedType::AsteroidCluster);
        assert_eq!(def.pick_seed_type(0.999_999), SeedType::AsteroidCluster);

        let empty = GeneratorDefinition { seed_types: Vec::new(), ..Default::default() };
        assert_eq!(empty.pick_seed_type(0.5), SeedType::Asteroid);
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"version": 2, "object_size_min": 32.0, "object_size_max": 128.0, "density": 0.5},
            {"version": 9, "object_size_min": 64.0, "object_size_max": 256.0, "density": 1.0,
             "seed_types": [{"seed_type": "asteroid_cluster", "weight": 1.0}]}
        ]"#;
        let t = DefinitionTable::from_json(json).unwrap();
        assert_eq!(t.len(), 2);
        let v9 = t.closest(9).unwrap();
        assert_eq!(v9.pick_seed_type(0.3), SeedType::AsteroidCluster);
        assert_eq!(t.closest(2).unwrap().cluster, ClusterParams::default());
    }
}
