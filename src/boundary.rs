//! Read-only queries over a finished grid, for whatever builds walls and doors on top of it.

use crate::{
    grid::{CellState, VoxelGrid},
    room::Room,
};

use ilattice3::Point;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::PosX, Side::NegX, Side::PosZ, Side::NegZ];

    pub fn offset(&self) -> [i32; 3] {
        match self {
            Side::PosX => [1, 0, 0],
            Side::NegX => [-1, 0, 0],
            Side::PosZ => [0, 0, 1],
            Side::NegZ => [0, 0, -1],
        }
    }

    pub fn neighbor(&self, p: &Point) -> Point {
        let [dx, dy, dz] = self.offset();

        [p.x + dx, p.y + dy, p.z + dz].into()
    }
}

/// One side of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    pub cell: Point,
    pub side: Side,
}

fn faces_where(
    grid: &VoxelGrid,
    cell_filter: impl Fn(&Point, CellState) -> bool,
    neighbor_filter: impl Fn(&Point, Option<CellState>) -> bool,
) -> Vec<Face> {
    let mut faces = Vec::new();
    for (cell, state) in grid.iter() {
        if !cell_filter(&cell, state) {
            continue;
        }
        for side in Side::ALL.iter() {
            let neighbor = side.neighbor(&cell);
            if neighbor_filter(&neighbor, grid.get(&neighbor).ok()) {
                faces.push(Face { cell, side: *side });
            }
        }
    }

    faces
}

/// Room cell faces that open onto a hallway.
pub fn doorways(grid: &VoxelGrid) -> Vec<Face> {
    faces_where(
        grid,
        |_, state| state == CellState::Room,
        |_, neighbor| neighbor == Some(CellState::Hallway),
    )
}

/// Hallway cell faces that border empty space or the edge of the grid.
pub fn hallway_walls(grid: &VoxelGrid) -> Vec<Face> {
    faces_where(
        grid,
        |_, state| state == CellState::Hallway,
        |_, neighbor| neighbor.map_or(true, |n| n == CellState::Empty),
    )
}

/// Faces leaving `room`, except the doorways.
pub fn room_walls(grid: &VoxelGrid, room: &Room) -> Vec<Face> {
    faces_where(
        grid,
        |cell, _| room.contains(cell),
        |neighbor, state| !room.contains(neighbor) && state != Some(CellState::Hallway),
    )
}
