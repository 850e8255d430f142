//! Integer cell coordinates on the generation grid

use serde::{Deserialize, Serialize};

use crate::core::types::DVec3;
use crate::math::Aabb;

/// Upper bound for the cell edge length in world units
pub const MAX_CELL_SIZE: f64 = 25_000.0;

/// Integer coordinate identifying a cell in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    /// Create a new cell coordinate
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert world position to the coordinate of the cell containing it
    pub fn from_world_pos(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i32,
            y: (pos.y / cell_size).floor() as i32,
            z: (pos.z / cell_size).floor() as i32,
        }
    }

    /// World-space origin (minimum corner) of this cell
    pub fn world_origin(&self, cell_size: f64) -> DVec3 {
        DVec3::new(
            self.x as f64 * cell_size,
            self.y as f64 * cell_size,
            self.z as f64 * cell_size,
        )
    }

    /// World-space bounding box of this cell
    pub fn bounds(&self, cell_size: f64) -> Aabb {
        let min = self.world_origin(cell_size);
        Aabb::new(min, min + DVec3::splat(cell_size))
    }

    /// Linear-index helper for sub-cell enumeration inside a cell
    pub fn linear_index(&self, per_side: i32) -> i32 {
        (self.z * per_side + self.y) * per_side + self.x
    }
}

/// Inclusive range of cell coordinates whose boxes touch `aabb`.
///
/// A box whose face lies exactly on a cell boundary also yields the cell on
/// the other side of that boundary.
pub fn cell_range(aabb: &Aabb, cell_size: f64) -> (CellCoord, CellCoord) {
    let lo = |v: f64| ((v / cell_size).ceil() - 1.0) as i32;
    let hi = |v: f64| (v / cell_size).floor() as i32;
    (
        CellCoord::new(lo(aabb.min.x), lo(aabb.min.y), lo(aabb.min.z)),
        CellCoord::new(hi(aabb.max.x), hi(aabb.max.y), hi(aabb.max.z)),
    )
}

/// Iterate every coordinate of an inclusive range, x fastest
pub fn iter_range(min: CellCoord, max: CellCoord) -> impl Iterator<Item = CellCoord> {
    (min.z..=max.z).flat_map(move |z| {
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y, z)))
    })
}

/// Clamp a configured cell size into `(0, MAX_CELL_SIZE]`
pub fn clamp_cell_size(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 {
        size.min(MAX_CELL_SIZE)
    } else {
        MAX_CELL_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_pos_negative() {
        let c = CellCoord::from_world_pos(DVec3::new(-1.0, 0.0, 25_001.0), 25_000.0);
        assert_eq!(c, CellCoord::new(-1, 0, 1));
    }

    #[test]
    fn test_bounds() {
        let b = CellCoord::new(1, -1, 0).bounds(100.0);
        assert_eq!(b.min, DVec3::new(100.0, -100.0, 0.0));
        assert_eq!(b.max, DVec3::new(200.0, 0.0, 100.0));
    }

    #[test]
    fn test_cell_range_includes_touching() {
        // Box from 100 to 150 touches cell 0 at x = 100
        let aabb = Aabb::new(DVec3::new(100.0, 10.0, 10.0), DVec3::new(150.0, 20.0, 20.0));
        let (min, max) = cell_range(&aabb, 100.0);
        assert_eq!(min, CellCoord::new(0, 0, 0));
        assert_eq!(max, CellCoord::new(1, 0, 0));
    }

    #[test]
    fn test_iter_range_count() {
        let coords: Vec<_> = iter_range(CellCoord::new(-1, -1, -1), CellCoord::new(1, 1, 1)).collect();
        assert_eq!(coords.len(), 27);
        assert_eq!(coords[0], CellCoord::new(-1, -1, -1));
        assert_eq!(coords[1], CellCoord::new(0, -1, -1));
    }

    #[test]
    fn test_clamp_cell_size() {
        assert_eq!(clamp_cell_size(1_000_000.0), MAX_CELL_SIZE);
        assert_eq!(clamp_cell_size(5_000.0), 5_000.0);
        assert_eq!(clamp_cell_size(-3.0), MAX_CELL_SIZE);
    }
}
