//! Candidate adjacency between rooms.
//!
//! Rooms are connected along the edges of a Delaunay triangulation of their centroids, so that
//! corridors are only attempted between neighbors. When the centroids are degenerate for the
//! chosen triangulation (too few, collinear, coplanar) there are no edges, and the builder falls
//! back to a k-nearest-neighbor graph instead.

pub mod nearest;
pub mod tetrahedra;
pub mod triangles;

use crate::{error::GenerationError, graph::Edge, room::Vertex};

use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};

pub type Vec2 = [f64; 2];
pub type Vec3 = [f64; 3];

pub const DEFAULT_NEAREST_NEIGHBORS: usize = 3;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TriangulationMode {
    /// `Planar` when every centroid sits at the same height, otherwise `Volumetric`.
    Auto,
    /// Triangulate the XZ projection of the centroids.
    Planar,
    /// Tetrahedralize the centroids in 3D.
    Volumetric,
}

impl Default for TriangulationMode {
    fn default() -> Self {
        TriangulationMode::Auto
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeSource {
    Tetrahedralization,
    Triangulation,
    NearestNeighbors,
    /// Fewer than two vertices; nothing to connect.
    Nothing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CandidateEdges {
    pub edges: Vec<Edge>,
    pub source: EdgeSource,
    /// True iff the triangulation was degenerate and the nearest neighbor graph was used.
    pub fell_back: bool,
}

pub struct ConnectivityGraphBuilder {
    mode: TriangulationMode,
    nearest_neighbors: usize,
}

impl Default for ConnectivityGraphBuilder {
    fn default() -> Self {
        ConnectivityGraphBuilder::new(TriangulationMode::default(), DEFAULT_NEAREST_NEIGHBORS)
    }
}

impl ConnectivityGraphBuilder {
    pub fn new(mode: TriangulationMode, nearest_neighbors: usize) -> Self {
        ConnectivityGraphBuilder {
            mode,
            nearest_neighbors,
        }
    }

    fn resolve_mode(&self, vertices: &[Vertex]) -> TriangulationMode {
        match self.mode {
            TriangulationMode::Auto => {
                let y0 = vertices.first().map(|v| v.position[1]).unwrap_or(0.0);
                if vertices.iter().all(|v| v.position[1] == y0) {
                    TriangulationMode::Planar
                } else {
                    TriangulationMode::Volumetric
                }
            }
            mode => mode,
        }
    }

    /// The triangulation edges alone, without any fallback. Empty when degenerate.
    pub fn triangulate(&self, vertices: &[Vertex]) -> (Vec<Edge>, EdgeSource) {
        let (pairs, source) = match self.resolve_mode(vertices) {
            TriangulationMode::Planar => {
                let points: Vec<Vec2> = vertices
                    .iter()
                    .map(|v| [v.position[0] as f64, v.position[2] as f64])
                    .collect();
                (triangles::triangulate(&points), EdgeSource::Triangulation)
            }
            _ => {
                let points: Vec<Vec3> = vertices
                    .iter()
                    .map(|v| {
                        [
                            v.position[0] as f64,
                            v.position[1] as f64,
                            v.position[2] as f64,
                        ]
                    })
                    .collect();
                (tetrahedra::tetrahedralize(&points), EdgeSource::Tetrahedralization)
            }
        };

        (pairs.into_iter().map(|(a, b)| Edge::new(a, b)).collect(), source)
    }

    pub fn build(&self, vertices: &[Vertex]) -> Result<CandidateEdges, GenerationError> {
        if vertices.len() < 2 {
            return Ok(CandidateEdges {
                edges: Vec::new(),
                source: EdgeSource::Nothing,
                fell_back: false,
            });
        }

        let (edges, source) = self.triangulate(vertices);
        if !edges.is_empty() {
            log::debug!("{:?} produced {} candidate edges", source, edges.len());
            return Ok(CandidateEdges {
                edges,
                source,
                fell_back: false,
            });
        }

        log::debug!(
            "{:?} of {} centroids was degenerate, falling back to {} nearest neighbors",
            source,
            vertices.len(),
            self.nearest_neighbors
        );
        let edges = nearest::nearest_neighbor_edges(vertices, self.nearest_neighbors);
        if edges.is_empty() {
            return Err(GenerationError::GraphDegenerate {
                rooms: vertices.len(),
            });
        }

        Ok(CandidateEdges {
            edges,
            source: EdgeSource::NearestNeighbors,
            fell_back: true,
        })
    }
}

pub(crate) fn sort_edges(edges: FnvHashSet<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut edges: Vec<_> = edges.into_iter().collect();
    edges.sort_unstable();

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_vertices(xz: &[(f32, f32)]) -> Vec<Vertex> {
        xz.iter()
            .enumerate()
            .map(|(room, (x, z))| Vertex {
                position: [*x, 0.5, *z],
                room,
            })
            .collect()
    }

    #[test]
    fn test_collinear_centroids_fall_back_to_nearest_neighbors() {
        let vertices = flat_vertices(&[(1.5, 2.0), (6.5, 2.0), (11.5, 2.0)]);

        for mode in [TriangulationMode::Auto, TriangulationMode::Volumetric].iter() {
            let candidates = ConnectivityGraphBuilder::new(*mode, 3)
                .build(&vertices)
                .unwrap();
            assert!(candidates.fell_back);
            assert_eq!(candidates.source, EdgeSource::NearestNeighbors);
            assert!(!candidates.edges.is_empty());
        }
    }

    #[test]
    fn test_flat_centroids_use_planar_triangulation() {
        let vertices = flat_vertices(&[(1.0, 1.0), (9.0, 2.0), (4.0, 8.0), (12.0, 10.0)]);
        let candidates = ConnectivityGraphBuilder::default().build(&vertices).unwrap();

        assert_eq!(candidates.source, EdgeSource::Triangulation);
        assert!(!candidates.fell_back);
        assert!(candidates.edges.len() >= 5);
    }

    #[test]
    fn test_flat_centroids_are_degenerate_in_volumetric_mode() {
        let vertices = flat_vertices(&[(1.0, 1.0), (9.0, 2.0), (4.0, 8.0), (12.0, 10.0)]);
        let builder = ConnectivityGraphBuilder::new(TriangulationMode::Volumetric, 3);

        assert!(builder.triangulate(&vertices).0.is_empty());
        assert!(builder.build(&vertices).unwrap().fell_back);
    }

    #[test]
    fn test_no_fallback_neighbors_is_fatal() {
        let vertices = flat_vertices(&[(3.0, 3.0), (9.0, 3.0)]);
        let builder = ConnectivityGraphBuilder::new(TriangulationMode::Volumetric, 0);
        let result = builder.build(&vertices);

        assert!(matches!(
            result,
            Err(GenerationError::GraphDegenerate { rooms: 2 })
        ));
    }

    #[test]
    fn test_single_room_has_no_edges() {
        let vertices = flat_vertices(&[(3.0, 3.0)]);
        let candidates = ConnectivityGraphBuilder::default().build(&vertices).unwrap();

        assert_eq!(candidates.source, EdgeSource::Nothing);
        assert!(candidates.edges.is_empty());
    }
}
