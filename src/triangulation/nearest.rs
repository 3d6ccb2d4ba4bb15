use crate::{graph::Edge, room::Vertex};

use std::cmp::Ordering;

/// Connects every vertex to its `k` nearest neighbors on the XZ plane. The same pair can show up
/// twice (once from each side); callers that care must dedupe.
pub fn nearest_neighbor_edges(vertices: &[Vertex], k: usize) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, vi) in vertices.iter().enumerate() {
        let mut neighbors: Vec<(f32, usize)> = vertices
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(j, vj)| (vi.horizontal_distance_squared(vj), j))
            .collect();
        neighbors.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        edges.extend(neighbors.iter().take(k).map(|(_, j)| Edge::new(i, *j)));
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(room: usize, x: f32, z: f32) -> Vertex {
        Vertex {
            position: [x, 0.5, z],
            room,
        }
    }

    #[test]
    fn test_collinear_rooms_get_neighbors() {
        let vertices = [vertex(0, 1.5, 1.5), vertex(1, 6.5, 1.5), vertex(2, 12.5, 1.5)];
        let edges = nearest_neighbor_edges(&vertices, 3);

        // Each vertex only has two others to pick from.
        assert_eq!(edges.len(), 6);
        assert!(edges.contains(&Edge::new(0, 2)));
        assert!(edges.contains(&Edge::new(1, 0)));
    }

    #[test]
    fn test_only_k_nearest_are_taken() {
        let vertices = [
            vertex(0, 0.0, 0.0),
            vertex(1, 1.0, 0.0),
            vertex(2, 0.0, 2.0),
            vertex(3, 3.0, 0.0),
            vertex(4, 20.0, 20.0),
        ];
        let edges = nearest_neighbor_edges(&vertices, 3);

        assert_eq!(&edges[..3], &[Edge::new(0, 1), Edge::new(0, 2), Edge::new(0, 3)]);
        assert_eq!(edges.len(), 15);
        assert_eq!(&edges[12..], &[Edge::new(4, 3), Edge::new(4, 2), Edge::new(4, 1)]);
        assert!(!edges.contains(&Edge::new(0, 4)));
    }
}
