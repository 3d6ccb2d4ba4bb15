pub mod boundary;
pub mod corridor;
pub mod error;
pub mod extent;
pub mod graph;
pub mod grid;
pub mod map_types;
pub mod pathfinding;
pub mod room;
pub mod sampling;
pub mod spawn;
pub mod triangulation;

mod symmetric_map;

use crate::grid::CellState;

use ilattice3::Point;

/// Implement this to allow the generated dungeon to be written into your voxel map.
pub trait VoxelEncoder {
    /// `cell` is the state of the dungeon cell at `point`.
    fn encode_voxel(&mut self, point: &Point, cell: CellState);
}
