//! Vertical thickness profiles for belts and rings

use serde::{Deserialize, Serialize};

/// Thickness every envelope keeps at the inner and outer edge
pub const MIN_EDGE_HEIGHT: f64 = 100.0;

/// Half-thickness of an annulus as a function of the radial position.
///
/// Both variants peak on the midline and taper toward the edges without
/// reaching zero, giving a lens-shaped cross-section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightEnvelope {
    /// `sin(t·π)·(H − 100) + 100`, peaks at `H`
    #[default]
    Sine,
    /// `sin²(t·π)·H/2 + 100`, flatter edges, peaks at `H/2 + 100`
    SineSquared,
}

impl HeightEnvelope {
    /// Half-thickness at normalized band position `t` in `[0, 1]`
    pub fn eval(self, t: f64, height: f64) -> f64 {
        let s = (t * std::f64::consts::PI).sin();
        match self {
            HeightEnvelope::Sine => s * (height - MIN_EDGE_HEIGHT) + MIN_EDGE_HEIGHT,
            HeightEnvelope::SineSquared => s * s * height * 0.5 + MIN_EDGE_HEIGHT,
        }
    }

    /// Largest value over the band
    pub fn peak(self, height: f64) -> f64 {
        self.eval(0.5, height).max(MIN_EDGE_HEIGHT)
    }
}
