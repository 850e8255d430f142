//! Error types for the astrofield engine

use thiserror::Error;

use crate::shapes::ShapeError;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Host error: {0}")]
    Host(String),

    #[error("No generator definition available")]
    NoDefinition,
}
