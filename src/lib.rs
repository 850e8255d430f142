//! Astrofield - deterministic cell-based procedural generation of asteroid fields

pub mod core;
pub mod math;
pub mod seed;
pub mod shapes;
pub mod grid;
pub mod generator;
pub mod tracking;
pub mod lifecycle;
pub mod bridge;
pub mod world;
pub mod config;
