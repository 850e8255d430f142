//! Uniform cell grid and spatial indexing

pub mod coord;
pub mod tree;
pub mod cell;

pub use coord::{CellCoord, MAX_CELL_SIZE, cell_range, clamp_cell_size, iter_range};
pub use tree::{DynamicAabbTree, ProxyId};
pub use cell::Cell;
