use crate::{
    error::{GridError, PathError},
    graph::Edge,
    grid::VoxelGrid,
    pathfinding::{corridor_step_cost, CorridorPathfinder, PathCost},
    room::Room,
};

use ilattice3::Point;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorridorReport {
    /// Edges that got a corridor, in the order they were carved.
    pub realized: Vec<Edge>,
    pub failed: Vec<(Edge, PathError)>,
    /// Cells turned from empty into hallway.
    pub carved_cells: usize,
    /// Number of cells on each realized path.
    pub path_lengths: Vec<usize>,
}

/// Connects rooms by searching a path between their representative cells and turning the empty
/// cells along it into hallway. Room cells on the path are left as they are.
pub struct CorridorCarver {
    widen: bool,
    pathfinder: CorridorPathfinder,
}

impl CorridorCarver {
    /// When `widen` is set, the cells on both sides of every step are claimed too.
    pub fn new(widen: bool, max_search_nodes: Option<usize>) -> Self {
        CorridorCarver {
            widen,
            pathfinder: CorridorPathfinder::new(max_search_nodes),
        }
    }

    fn claim(grid: &mut VoxelGrid, p: &Point) -> Result<usize, GridError> {
        if !grid.in_bounds(p) {
            return Ok(0);
        }

        Ok(grid.carve_hallway(p)? as usize)
    }

    /// Returns the number of cells that changed.
    pub fn carve_path(&self, grid: &mut VoxelGrid, path: &[Point]) -> Result<usize, GridError> {
        let mut carved = 0;
        for (i, p) in path.iter().enumerate() {
            carved += grid.carve_hallway(p)? as usize;

            if !self.widen || i == 0 {
                continue;
            }
            let prev = path[i - 1];
            let sides: [[i32; 3]; 2] = if p.x != prev.x {
                [[0, 0, 1], [0, 0, -1]]
            } else if p.z != prev.z {
                [[1, 0, 0], [-1, 0, 0]]
            } else {
                continue;
            };
            for side in sides.iter() {
                carved += Self::claim(grid, &[p.x + side[0], p.y + side[1], p.z + side[2]].into())?;
            }
        }

        Ok(carved)
    }

    /// Carves a corridor for every edge with the default cost model.
    pub fn connect<'a>(
        &mut self,
        grid: &mut VoxelGrid,
        rooms: &[Room],
        edges: impl Iterator<Item = &'a Edge>,
    ) -> Result<CorridorReport, GridError> {
        self.connect_with(grid, rooms, edges, |grid, _, to, goal| {
            corridor_step_cost(grid, to, goal)
        })
    }

    /// Like `connect`, with `step_cost(grid, from, to, goal)` pricing each move. An edge without a
    /// path is recorded as failed and the rest are still attempted.
    pub fn connect_with<'a>(
        &mut self,
        grid: &mut VoxelGrid,
        rooms: &[Room],
        edges: impl Iterator<Item = &'a Edge>,
        mut step_cost: impl FnMut(&VoxelGrid, &Point, &Point, &Point) -> PathCost,
    ) -> Result<CorridorReport, GridError> {
        let mut report = CorridorReport::default();
        for edge in edges {
            let start = rooms[edge.a()].representative_cell();
            let goal = rooms[edge.b()].representative_cell();

            let search_grid: &VoxelGrid = grid;
            let found = self
                .pathfinder
                .find_path(search_grid, start, goal, |from, to| {
                    step_cost(search_grid, from, to, &goal)
                });

            match found {
                Ok(path) => {
                    report.carved_cells += self.carve_path(grid, &path)?;
                    report.path_lengths.push(path.len());
                    report.realized.push(*edge);
                }
                Err(e) => {
                    log::debug!("No corridor for {:?}: {}", edge, e);
                    report.failed.push((*edge, e));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::CellState, room::RoomPlacer, sampling::small_rng};

    fn rooms_in(grid: &mut VoxelGrid, rooms: &[Room]) -> Vec<Room> {
        let placer = RoomPlacer::new([8, 1, 8].into());
        let placement = placer
            .place_rooms(0, rooms, grid, &mut small_rng(0))
            .unwrap();
        assert_eq!(placement.rooms.len(), rooms.len());

        placement.rooms
    }

    #[test]
    fn test_corridor_connects_rooms_without_touching_them() {
        let mut grid = VoxelGrid::new([20, 1, 10].into()).unwrap();
        let rooms = rooms_in(
            &mut grid,
            &[
                Room::new([1, 0, 1].into(), [3, 1, 3].into()),
                Room::new([12, 0, 5].into(), [4, 1, 3].into()),
            ],
        );
        let room_cells = grid.count(CellState::Room);

        let report = CorridorCarver::new(false, None)
            .connect(&mut grid, &rooms, [Edge::new(0, 1)].iter())
            .unwrap();

        assert_eq!(report.realized, vec![Edge::new(0, 1)]);
        assert!(report.failed.is_empty());
        assert_eq!(grid.count(CellState::Room), room_cells);
        assert_eq!(grid.count(CellState::Hallway), report.carved_cells);
        assert!(report.carved_cells > 0);
    }

    #[test]
    fn test_widening_claims_side_cells() {
        let mut grid = VoxelGrid::new([10, 1, 5].into()).unwrap();
        let path: Vec<Point> = (1..8).map(|x| [x, 0, 2].into()).collect();

        let carved = CorridorCarver::new(true, None)
            .carve_path(&mut grid, &path)
            .unwrap();

        // The first cell has no direction to widen from.
        assert_eq!(carved, 7 + 2 * 6);
        assert_eq!(grid.get(&[4, 0, 1].into()), Ok(CellState::Hallway));
        assert_eq!(grid.get(&[4, 0, 3].into()), Ok(CellState::Hallway));
        assert_eq!(grid.get(&[1, 0, 1].into()), Ok(CellState::Empty));
    }

    #[test]
    fn test_widening_stops_at_grid_edge() {
        let mut grid = VoxelGrid::new([5, 1, 1].into()).unwrap();
        let path: Vec<Point> = (0..5).map(|x| [x, 0, 0].into()).collect();

        let carved = CorridorCarver::new(true, None)
            .carve_path(&mut grid, &path)
            .unwrap();

        assert_eq!(carved, 5);
    }

    #[test]
    fn test_blocked_edge_is_reported_and_others_are_carved() {
        let mut grid = VoxelGrid::new([24, 1, 10].into()).unwrap();
        let rooms = rooms_in(
            &mut grid,
            &[
                Room::new([1, 0, 1].into(), [3, 1, 3].into()),
                Room::new([8, 0, 5].into(), [3, 1, 3].into()),
                Room::new([18, 0, 2].into(), [4, 1, 4].into()),
            ],
        );
        let edges = [Edge::new(0, 2), Edge::new(0, 1)];

        // Nothing may cross x = 15, which cuts the last room off.
        let report = CorridorCarver::new(true, None)
            .connect_with(&mut grid, &rooms, edges.iter(), |grid, _, to, goal| {
                if to.x == 15 {
                    PathCost::blocked()
                } else {
                    corridor_step_cost(grid, to, goal)
                }
            })
            .unwrap();

        assert_eq!(report.failed, vec![(Edge::new(0, 2), PathError::Unreachable)]);
        assert_eq!(report.realized, vec![Edge::new(0, 1)]);
        assert!(grid.count(CellState::Hallway) > 0);
        for x in 15..24 {
            for z in 0..10 {
                assert_ne!(grid.get(&[x, 0, z].into()), Ok(CellState::Hallway));
            }
        }
    }
}
