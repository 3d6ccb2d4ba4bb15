use crate::{
    error::{GridError, PathError},
    grid::{CellState, VoxelGrid},
};

use ilattice3::Point;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub const BASE_STEP_COST: f32 = 1.0;
pub const EMPTY_PENALTY: f32 = 1.0;
pub const ROOM_PENALTY: f32 = 1.0;
pub const HALLWAY_PENALTY: f32 = 0.1;

/// Corridors stay on their floor.
const HORIZONTAL_STEPS: [[i32; 3]; 4] = [[1, 0, 0], [-1, 0, 0], [0, 0, 1], [0, 0, -1]];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathCost {
    pub traversable: bool,
    pub cost: f32,
}

impl PathCost {
    pub fn blocked() -> Self {
        PathCost {
            traversable: false,
            cost: std::f32::INFINITY,
        }
    }

    pub fn step(cost: f32) -> Self {
        PathCost {
            traversable: true,
            cost,
        }
    }
}

/// Cost of stepping into `to` on the way to `goal`. Existing hallways are much cheaper than empty
/// cells or other rooms, so corridors merge where they can.
pub fn corridor_step_cost(grid: &VoxelGrid, to: &Point, goal: &Point) -> PathCost {
    let cell = match grid.get(to) {
        Ok(cell) => cell,
        Err(_) => return PathCost::blocked(),
    };
    if to == goal {
        return PathCost::step(BASE_STEP_COST);
    }

    let penalty = match cell {
        CellState::Room => ROOM_PENALTY,
        CellState::Empty => EMPTY_PENALTY,
        CellState::Hallway => HALLWAY_PENALTY,
        CellState::Stairs => 0.0,
    };

    PathCost::step(BASE_STEP_COST + penalty)
}

fn euclidean(a: &Point, b: &Point) -> f32 {
    let (dx, dy, dz) = ((a.x - b.x) as f32, (a.y - b.y) as f32, (a.z - b.z) as f32);

    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[derive(Debug)]
struct OpenNode {
    estimate: f32,
    order: usize,
    index: usize,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    // Lowest estimate first; among equals, the most recently opened.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .partial_cmp(&self.estimate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over the horizontal neighbors of grid cells. Scratch buffers are kept between searches.
#[derive(Default)]
pub struct CorridorPathfinder {
    max_expansions: Option<usize>,
    cost_so_far: Vec<f32>,
    came_from: Vec<Option<usize>>,
    closed: Vec<bool>,
}

impl CorridorPathfinder {
    /// `max_expansions` bounds the work done by one search.
    pub fn new(max_expansions: Option<usize>) -> Self {
        CorridorPathfinder {
            max_expansions,
            ..CorridorPathfinder::default()
        }
    }

    fn reset(&mut self, volume: usize) {
        self.cost_so_far.clear();
        self.cost_so_far.resize(volume, std::f32::INFINITY);
        self.came_from.clear();
        self.came_from.resize(volume, None);
        self.closed.clear();
        self.closed.resize(volume, false);
    }

    /// Finds the cheapest path from `start` to `goal`, both inclusive. `step_cost(from, to)` prices
    /// each move; the straight line distance to `goal` is the heuristic, so step costs should be at
    /// least 1 for the result to be optimal. Negative costs count as zero.
    pub fn find_path(
        &mut self,
        grid: &VoxelGrid,
        start: Point,
        goal: Point,
        mut step_cost: impl FnMut(&Point, &Point) -> PathCost,
    ) -> Result<Vec<Point>, PathError> {
        let out_of_bounds = |point: Point| GridError::OutOfBounds {
            point,
            size: grid.size(),
        };
        let start_index = grid.index(&start).ok_or_else(|| out_of_bounds(start))?;
        let goal_index = grid.index(&goal).ok_or_else(|| out_of_bounds(goal))?;

        self.reset(grid.volume());
        self.cost_so_far[start_index] = 0.0;
        let mut open = BinaryHeap::new();
        let mut opened = 0;
        open.push(OpenNode {
            estimate: euclidean(&start, &goal),
            order: opened,
            index: start_index,
        });

        let mut expanded = 0;
        while let Some(OpenNode { index, .. }) = open.pop() {
            if self.closed[index] {
                continue;
            }
            self.closed[index] = true;

            if index == goal_index {
                return Ok(self.reconstruct(grid, goal_index));
            }

            expanded += 1;
            if let Some(max) = self.max_expansions {
                if expanded > max {
                    return Err(PathError::BudgetExhausted { expanded: max });
                }
            }

            let current = grid.point_at_index(index);
            for step in HORIZONTAL_STEPS.iter() {
                let next: Point =
                    [current.x + step[0], current.y + step[1], current.z + step[2]].into();
                let cost = step_cost(&current, &next);
                if !cost.traversable {
                    continue;
                }
                let next_index = match grid.index(&next) {
                    Some(i) => i,
                    None => continue,
                };
                if self.closed[next_index] {
                    continue;
                }

                let tentative = self.cost_so_far[index] + cost.cost.max(0.0);
                if tentative < self.cost_so_far[next_index] {
                    self.cost_so_far[next_index] = tentative;
                    self.came_from[next_index] = Some(index);
                    opened += 1;
                    open.push(OpenNode {
                        estimate: tentative + euclidean(&next, &goal),
                        order: opened,
                        index: next_index,
                    });
                }
            }
        }

        Err(PathError::Unreachable)
    }

    fn reconstruct(&self, grid: &VoxelGrid, goal_index: usize) -> Vec<Point> {
        let mut path = vec![grid.point_at_index(goal_index)];
        let mut index = goal_index;
        while let Some(previous) = self.came_from[index] {
            path.push(grid.point_at_index(previous));
            index = previous;
        }
        path.reverse();

        path
    }
}
