use crate::room::{Room, RoomCenter};

use ilattice3::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct SpawnArea {
    pub valid_spawn_points: Vec<Point>,
}

/// The floor cells of `room`.
pub fn spawn_area(room: &Room) -> SpawnArea {
    let floor = room.bounds().get_minimum().y;

    SpawnArea {
        valid_spawn_points: room.bounds().into_iter().filter(|p| p.y == floor).collect(),
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SpawnMode {
    FirstRoom,
    RandomRoom,
    /// One end of the pair of rooms that are farthest apart.
    FarthestPairStart,
}

impl Default for SpawnMode {
    fn default() -> Self {
        SpawnMode::RandomRoom
    }
}

fn horizontal_distance_squared(a: &RoomCenter, b: &RoomCenter) -> f32 {
    (a[0] - b[0]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Picks the room center the player starts in. `None` iff there are no rooms.
pub fn choose_spawn_center(
    centers: &[RoomCenter],
    mode: SpawnMode,
    rng: &mut impl Rng,
) -> Option<RoomCenter> {
    if centers.is_empty() {
        return None;
    }

    let center = match mode {
        SpawnMode::FirstRoom => centers[0],
        SpawnMode::RandomRoom => centers[rng.gen_range(0, centers.len())],
        SpawnMode::FarthestPairStart => {
            let mut best = -1.0;
            let mut best_center = centers[0];
            for (i, a) in centers.iter().enumerate() {
                for b in centers[i + 1..].iter() {
                    let d = horizontal_distance_squared(a, b);
                    if d > best {
                        best = d;
                        best_center = *a;
                    }
                }
            }

            best_center
        }
    };

    Some(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::small_rng;

    #[test]
    fn test_spawn_area_is_room_floor() {
        let room = Room::new([2, 0, 3].into(), [3, 1, 2].into());
        let area = spawn_area(&room);

        assert_eq!(area.valid_spawn_points.len(), 6);
        assert!(area.valid_spawn_points.iter().all(|p| room.contains(p)));
    }

    #[test]
    fn test_spawn_modes() {
        let centers = [[5.0, 0.0, 5.0], [1.0, 0.0, 1.0], [6.0, 0.0, 4.0], [19.0, 0.0, 18.0]];
        let mut rng = small_rng(3);

        assert_eq!(
            choose_spawn_center(&centers, SpawnMode::FirstRoom, &mut rng),
            Some(centers[0])
        );
        assert_eq!(
            choose_spawn_center(&centers, SpawnMode::FarthestPairStart, &mut rng),
            Some(centers[1])
        );
        let random = choose_spawn_center(&centers, SpawnMode::RandomRoom, &mut rng).unwrap();
        assert!(centers.contains(&random));
        assert_eq!(choose_spawn_center(&[], SpawnMode::RandomRoom, &mut rng), None);
    }
}
