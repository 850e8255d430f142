//! Candidate object generation for grid cells

pub mod definition;
pub mod object_seed;
pub mod asteroid;

pub use definition::{ClusterParams, DefinitionTable, GeneratorDefinition, SeedTypeWeight};
pub use object_seed::{ObjectSeed, ObjectSeedParams, SeedType};
pub use asteroid::{AsteroidFieldGenerator, CellGenerator, CLUSTER_INDEX_STRIDE, MAX_SUBCELLS_PER_SIDE};
