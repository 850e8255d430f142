//! Core type aliases and re-exports

pub use glam::{DMat3, DQuat, DVec3, EulerRot};

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
