use crate::{error::GridError, VoxelEncoder};

use ilattice3::{Extent, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CellState {
    Empty,
    Room,
    Hallway,
    Stairs,
}

impl Default for CellState {
    fn default() -> Self {
        CellState::Empty
    }
}

/// Largest grid dimension on any axis, so room and buffer corners never overflow.
pub const MAX_GRID_EXTENT: i32 = 1 << 24;

/// Number of cells in a grid of `size`, or `None` when it is too large to index with `i32`.
/// Negative dimensions count as zero.
pub fn grid_volume(size: &Point) -> Option<usize> {
    let dims = [size.x.max(0), size.y.max(0), size.z.max(0)];
    if dims.iter().any(|d| *d > MAX_GRID_EXTENT) {
        return None;
    }

    dims[0]
        .checked_mul(dims[1])?
        .checked_mul(dims[2])
        .map(|v| v as usize)
}

/// Dense cell storage for a box anchored at the origin. Every accessor is bounds-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
    size: Point,
    cells: Vec<CellState>,
}

impl VoxelGrid {
    /// Negative dimensions are treated as zero.
    pub fn new(size: Point) -> Result<Self, GridError> {
        let volume = grid_volume(&size).ok_or(GridError::TooLarge { size })?;
        let size: Point = [size.x.max(0), size.y.max(0), size.z.max(0)].into();

        Ok(VoxelGrid {
            size,
            cells: vec![CellState::Empty; volume],
        })
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn volume(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty_volume(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn extent(&self) -> Extent {
        Extent::from_min_and_local_supremum([0, 0, 0].into(), self.size)
    }

    pub fn in_bounds(&self, p: &Point) -> bool {
        p.x >= 0
            && p.y >= 0
            && p.z >= 0
            && p.x < self.size.x
            && p.y < self.size.y
            && p.z < self.size.z
    }

    /// Linear index of `p`, if it lies in the grid.
    pub fn index(&self, p: &Point) -> Option<usize> {
        if !self.in_bounds(p) {
            return None;
        }

        Some(((p.y * self.size.z + p.z) * self.size.x + p.x) as usize)
    }

    pub fn point_at_index(&self, index: usize) -> Point {
        let i = index as i32;
        let layer = self.size.x * self.size.z;

        [i % self.size.x, i / layer, (i % layer) / self.size.x].into()
    }

    fn checked_index(&self, p: &Point) -> Result<usize, GridError> {
        self.index(p).ok_or(GridError::OutOfBounds {
            point: *p,
            size: self.size,
        })
    }

    pub fn get(&self, p: &Point) -> Result<CellState, GridError> {
        let i = self.checked_index(p)?;

        Ok(self.cells[i])
    }

    pub fn set(&mut self, p: &Point, state: CellState) -> Result<(), GridError> {
        let i = self.checked_index(p)?;
        self.cells[i] = state;

        Ok(())
    }

    /// Marks `p` as hallway only if it is currently empty. Returns true iff the cell changed.
    pub fn carve_hallway(&mut self, p: &Point) -> Result<bool, GridError> {
        let i = self.checked_index(p)?;
        if self.cells[i] != CellState::Empty {
            return Ok(false);
        }
        self.cells[i] = CellState::Hallway;

        Ok(true)
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|c| **c == state).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (self.point_at_index(i), *c))
    }

    pub fn clear(&mut self) {
        for c in self.cells.iter_mut() {
            *c = CellState::Empty;
        }
    }

    /// Writes every non-empty cell into `encoder`.
    pub fn encode_into(&self, encoder: &mut impl VoxelEncoder) {
        for (p, cell) in self.iter() {
            if cell != CellState::Empty {
                encoder.encode_voxel(&p, cell);
            }
        }
    }
}
