use crate::{
    error::GridError,
    extent::{central_cell, centroid, extent_max, extent_volume, extents_overlap, pad_horizontal},
    grid::{CellState, VoxelGrid},
    sampling::LatticeUniformDistSpec,
};

use ilattice3::{Extent, Point};
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

/// A room centroid on the ground plane, handed to spawners.
pub type RoomCenter = [f32; 3];

/// Empty cells kept between a room and its neighbors on the horizontal axes.
pub const ROOM_MARGIN: i32 = 1;

/// An axis-aligned box of room cells. Never changes after it is accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Room {
    bounds: Extent,
}

impl Room {
    pub fn new(origin: Point, size: Point) -> Self {
        Room {
            bounds: Extent::from_min_and_local_supremum(origin, size),
        }
    }

    pub fn bounds(&self) -> &Extent {
        &self.bounds
    }

    /// The bounds grown by `ROOM_MARGIN`, only used for overlap tests.
    pub fn buffer(&self) -> Extent {
        pad_horizontal(&self.bounds, ROOM_MARGIN)
    }

    pub fn centroid(&self) -> [f32; 3] {
        centroid(&self.bounds)
    }

    /// The centroid projected onto the ground plane (y = 0).
    pub fn floor_center(&self) -> RoomCenter {
        let [x, _, z] = self.centroid();

        [x, 0.0, z]
    }

    /// The cell corridors start and end at.
    pub fn representative_cell(&self) -> Point {
        central_cell(&self.bounds)
    }

    pub fn max(&self) -> Point {
        extent_max(&self.bounds)
    }

    pub fn volume(&self) -> usize {
        extent_volume(&self.bounds)
    }

    pub fn contains(&self, p: &Point) -> bool {
        let min = self.bounds.get_minimum();
        let max = self.max();

        p.x >= min.x && p.y >= min.y && p.z >= min.z && p.x <= max.x && p.y <= max.y && p.z <= max.z
    }

    pub fn fits_in(&self, grid: &VoxelGrid) -> bool {
        let sup = self.bounds.get_local_supremum();
        sup.x > 0
            && sup.y > 0
            && sup.z > 0
            && grid.in_bounds(self.bounds.get_minimum())
            && grid.in_bounds(&self.max())
    }
}

/// A graph vertex: a room centroid plus the index of the room it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub room: usize,
}

impl Vertex {
    pub fn distance(&self, other: &Vertex) -> f32 {
        let [ax, ay, az] = self.position;
        let [bx, by, bz] = other.position;

        ((ax - bx).powi(2) + (ay - by).powi(2) + (az - bz).powi(2)).sqrt()
    }

    pub fn horizontal_distance_squared(&self, other: &Vertex) -> f32 {
        let [ax, _, az] = self.position;
        let [bx, _, bz] = other.position;

        (ax - bx).powi(2) + (az - bz).powi(2)
    }
}

pub fn room_vertices(rooms: &[Room]) -> Vec<Vertex> {
    rooms
        .iter()
        .enumerate()
        .map(|(room, r)| Vertex {
            position: r.centroid(),
            room,
        })
        .collect()
}

/// A room given up front in a dungeon spec rather than sampled.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomSpec {
    pub origin: [i32; 3],
    pub size: [i32; 3],
}

impl RoomSpec {
    pub fn make(&self) -> Room {
        Room::new(self.origin.into(), self.size.into())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    pub rooms: Vec<Room>,
    pub attempts: usize,
    pub rejected: usize,
}

/// Rejection sampler for non-overlapping rooms. Each attempt is used at most once; a rejected
/// candidate is dropped, not retried.
pub struct RoomPlacer {
    max_room_size: Point,
}

impl RoomPlacer {
    pub fn new(max_room_size: Point) -> Self {
        RoomPlacer { max_room_size }
    }

    fn origin_dist(grid: &VoxelGrid) -> LatticeUniformDistSpec {
        let size = grid.size();

        LatticeUniformDistSpec {
            x: (0, size.x - 1),
            y: (0, 0),
            z: (0, size.z - 1),
        }
    }

    /// Room sizes never exceed the grid.
    fn size_dist(&self, grid: &VoxelGrid) -> LatticeUniformDistSpec {
        let size = grid.size();

        LatticeUniformDistSpec {
            x: (1, self.max_room_size.x.min(size.x)),
            y: (1, 1),
            z: (1, self.max_room_size.z.min(size.z)),
        }
    }

    /// Accepts `candidate` iff it lies in the grid and its buffer is clear of every accepted
    /// room's buffer. Accepted rooms are stamped into `grid`.
    pub fn try_accept(
        &self,
        candidate: Room,
        rooms: &mut Vec<Room>,
        grid: &mut VoxelGrid,
    ) -> Result<bool, GridError> {
        if !candidate.fits_in(grid) {
            return Ok(false);
        }

        let buffer = candidate.buffer();
        if rooms.iter().any(|r| extents_overlap(&r.buffer(), &buffer)) {
            return Ok(false);
        }

        for p in candidate.bounds() {
            grid.set(&p, CellState::Room)?;
        }
        rooms.push(candidate);

        Ok(true)
    }

    /// Offers every preset, then makes `room_count` random attempts.
    pub fn place_rooms(
        &self,
        room_count: usize,
        presets: &[Room],
        grid: &mut VoxelGrid,
        rng: &mut impl Rng,
    ) -> Result<Placement, GridError> {
        let mut placement = Placement::default();

        for preset in presets.iter() {
            placement.attempts += 1;
            if !self.try_accept(*preset, &mut placement.rooms, grid)? {
                log::debug!("Rejected preset room {:?}", preset.bounds());
                placement.rejected += 1;
            }
        }

        let origin_spec = Self::origin_dist(grid);
        let size_spec = self.size_dist(grid);
        if room_count == 0 || !origin_spec.is_valid() || !size_spec.is_valid() {
            return Ok(placement);
        }
        let origin_dist = origin_spec.make();
        let size_dist = size_spec.make();

        for _ in 0..room_count {
            placement.attempts += 1;
            let origin = origin_dist.sample(rng);
            let size = size_dist.sample(rng);
            if !self.try_accept(Room::new(origin, size), &mut placement.rooms, grid)? {
                placement.rejected += 1;
            }
        }
        log::debug!(
            "Placed {} rooms in {} attempts",
            placement.rooms.len(),
            placement.attempts
        );

        Ok(placement)
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::small_rng;

    fn place(seed: u64, room_count: usize) -> (Placement, VoxelGrid) {
        let mut grid = VoxelGrid::new([30, 1, 30].into()).unwrap();
        let placer = RoomPlacer::new([6, 1, 6].into());
        let placement = placer
            .place_rooms(room_count, &[], &mut grid, &mut small_rng(seed))
            .unwrap();

        (placement, grid)
    }

    #[test]
    fn test_accepted_room_buffers_do_not_overlap() {
        for seed in 0..20 {
            let (placement, _) = place(seed, 25);
            let rooms = &placement.rooms;
            for i in 0..rooms.len() {
                for j in i + 1..rooms.len() {
                    assert!(!extents_overlap(&rooms[i].buffer(), &rooms[j].buffer()));
                }
            }
        }
    }

    #[test]
    fn test_accepted_rooms_lie_in_grid() {
        for seed in 0..20 {
            let (placement, grid) = place(seed, 25);
            for room in placement.rooms.iter() {
                for p in room.bounds() {
                    assert!(grid.in_bounds(&p));
                }
            }
        }
    }

    #[test]
    fn test_attempts_are_not_retried() {
        let (placement, _) = place(3, 40);

        assert_eq!(placement.attempts, 40);
        assert_eq!(placement.rooms.len() + placement.rejected, 40);
    }

    #[test]
    fn test_room_cells_are_stamped() {
        let (placement, grid) = place(11, 10);
        let expected: usize = placement.rooms.iter().map(|r| r.volume()).sum();

        assert_eq!(grid.count(CellState::Room), expected);
        for room in placement.rooms.iter() {
            for p in room.bounds() {
                assert_eq!(grid.get(&p), Ok(CellState::Room));
            }
        }
    }

    #[test]
    fn test_presets_are_placed_first_and_validated() {
        let mut grid = VoxelGrid::new([20, 1, 20].into()).unwrap();
        let placer = RoomPlacer::new([4, 1, 4].into());
        let presets = [
            Room::new([1, 0, 1].into(), [3, 1, 3].into()),
            // Touches the first room edge to edge.
            Room::new([4, 0, 1].into(), [2, 1, 2].into()),
            // Sticks out of the grid.
            Room::new([18, 0, 18].into(), [4, 1, 1].into()),
        ];
        let placement = placer
            .place_rooms(0, &presets, &mut grid, &mut small_rng(0))
            .unwrap();

        assert_eq!(placement.rooms, vec![presets[0]]);
        assert_eq!(placement.rejected, 2);
    }

    #[test]
    fn test_room_size_is_limited_by_grid() {
        let mut grid = VoxelGrid::new([10, 1, 10].into()).unwrap();
        let placer = RoomPlacer::new([i32::MAX, 1, i32::MAX].into());
        let placement = placer
            .place_rooms(30, &[], &mut grid, &mut small_rng(5))
            .unwrap();

        assert_eq!(placement.attempts, 30);
        assert!(placement.rooms.iter().all(|r| r.fits_in(&grid)));
    }

    #[test]
    fn test_representative_cell_is_inside_room() {
        let room = Room::new([5, 0, 2].into(), [1, 1, 4].into());

        assert!(room.contains(&room.representative_cell()));
        assert_eq!(room.floor_center(), [5.5, 0.0, 4.0]);
    }
}
