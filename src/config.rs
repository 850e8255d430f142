//! World-level generation settings, stored as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::DVec3;
use crate::core::{Error, Result};
use crate::grid::clamp_cell_size;
use crate::shapes::{HeightEnvelope, RegionConfig, RegionSet};

/// Settings a server operator authors for one world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Fixed once per world
    pub global_seed: i32,
    /// Cell edge length, clamped to [`crate::grid::MAX_CELL_SIZE`]
    pub cell_size: f64,
    /// Tracking radius for player characters
    pub view_distance: f64,
    /// Asteroid density in `[0, 1]`
    pub density: f64,
    /// Generator definition version matching the active world settings
    pub definition_version: u32,
    pub regions: Vec<RegionConfig>,
    /// Thickness profile used by belts and rings
    pub envelope: HeightEnvelope,
    /// Fraction of the cell size an entity must move before its cells are re-evaluated
    pub move_threshold_fraction: f64,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            global_seed: 12345,
            cell_size: 25_000.0,
            view_distance: 20_000.0,
            density: 0.5,
            definition_version: 1,
            regions: vec![RegionConfig::Belt {
                center: DVec3::ZERO,
                radius: 100_000.0,
                width: 40_000.0,
                height: 4_000.0,
            }],
            envelope: HeightEnvelope::Sine,
            move_threshold_fraction: 0.5,
        }
    }
}

impl FieldSettings {
    /// Read and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write the settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check value ranges and that every region builds
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.density) {
            return Err(Error::Config(format!("density must be in [0, 1], got {}", self.density)));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::Config(format!("cell_size must be > 0, got {}", self.cell_size)));
        }
        if !(self.view_distance.is_finite() && self.view_distance > 0.0) {
            return Err(Error::Config(format!("view_distance must be > 0, got {}", self.view_distance)));
        }
        if !(self.move_threshold_fraction > 0.0 && self.move_threshold_fraction.is_finite()) {
            return Err(Error::Config(format!(
                "move_threshold_fraction must be > 0, got {}",
                self.move_threshold_fraction
            )));
        }
        RegionSet::from_configs(&self.regions, self.envelope)?;
        Ok(())
    }

    /// Cell size after clamping
    pub fn effective_cell_size(&self) -> f64 {
        clamp_cell_size(self.cell_size)
    }

    /// Distance an entity must move before its cells are re-evaluated
    pub fn move_threshold(&self) -> f64 {
        self.effective_cell_size() * self.move_threshold_fraction
    }
}
