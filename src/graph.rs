use crate::{room::Vertex, symmetric_map::SymmetricMap};

use fnv::FnvHashSet;
use petgraph::{
    algo::tarjan_scc,
    dot::{Config, Dot},
    graph::{EdgeIndex, NodeIndex},
    stable_graph::StableGraph,
    visit::EdgeRef,
    EdgeType, Undirected,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Chance that a candidate edge left out of the spanning tree is kept anyway, making a loop.
pub const DEFAULT_LOOP_CHANCE: f64 = 0.125;

/// An unordered pair of room indices. `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    a: usize,
    b: usize,
}

impl Edge {
    pub fn new(i: usize, j: usize) -> Self {
        let (a, b) = SymmetricMap::<()>::order_indices(i, j);

        Edge { a, b }
    }

    pub fn a(&self) -> usize {
        self.a
    }

    pub fn b(&self) -> usize {
        self.b
    }

    /// Euclidean distance between the endpoint centroids.
    pub fn weight(&self, vertices: &[Vertex]) -> f32 {
        vertices[self.a].distance(&vertices[self.b])
    }
}

pub type RoomGraph = StableGraph<usize, f32, Undirected>;

pub fn component_count<N, E, Ty: EdgeType>(graph: &StableGraph<N, E, Ty>) -> usize {
    tarjan_scc(graph).len()
}

/// Candidate edges, deduplicated, as a graph over every vertex (including isolated ones).
pub struct CandidateGraph {
    graph: RoomGraph,
    nodes: Vec<NodeIndex>,
    edge_indices: SymmetricMap<EdgeIndex>,
    edges: Vec<Edge>,
}

impl CandidateGraph {
    pub fn new(vertices: &[Vertex], candidates: &[Edge]) -> Self {
        let mut graph = RoomGraph::default();
        let nodes: Vec<_> = (0..vertices.len()).map(|i| graph.add_node(i)).collect();

        let mut edge_indices = SymmetricMap::new();
        let mut edges = Vec::new();
        for e in candidates.iter() {
            if e.a() == e.b() || edge_indices.contains(e.a(), e.b()) {
                continue;
            }
            let index = graph.add_edge(nodes[e.a()], nodes[e.b()], e.weight(vertices));
            edge_indices.insert(e.a(), e.b(), index);
            edges.push(*e);
        }

        CandidateGraph {
            graph,
            nodes,
            edge_indices,
            edges,
        }
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn vertex_count(&self) -> usize {
        self.nodes.len()
    }

    /// Unique edges in the order they were first offered.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn contains(&self, e: &Edge) -> bool {
        self.edge_indices.contains(e.a(), e.b())
    }

    pub fn weight(&self, e: &Edge) -> Option<f32> {
        self.edge_indices
            .get(e.a(), e.b())
            .map(|index| self.graph[*index])
    }

    pub fn component_count(&self) -> usize {
        component_count(&self.graph)
    }

    /// A graph over all vertices holding only `edges`, weighted like the candidates.
    pub fn subgraph<'a>(&self, edges: impl Iterator<Item = &'a Edge>) -> RoomGraph {
        let mut g = RoomGraph::default();
        let nodes: Vec<_> = (0..self.vertex_count()).map(|i| g.add_node(i)).collect();
        for e in edges {
            g.add_edge(nodes[e.a()], nodes[e.b()], self.weight(e).unwrap_or(0.0));
        }

        g
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeSelection {
    pub tree: Vec<Edge>,
    pub loops: Vec<Edge>,
    /// Vertices the spanning tree could not reach from its start.
    pub unreached: Vec<usize>,
}

impl EdgeSelection {
    /// Tree edges first, then loop edges.
    pub fn selected(&self) -> impl Iterator<Item = &Edge> {
        self.tree.iter().chain(self.loops.iter())
    }

    pub fn len(&self) -> usize {
        self.tree.len() + self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_graph(&self, graph: &CandidateGraph) -> RoomGraph {
        graph.subgraph(self.selected())
    }
}

#[derive(Debug)]
struct FrontierEdge {
    weight: f32,
    order: usize,
    edge: Edge,
    to: usize,
}

impl PartialEq for FrontierEdge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEdge {}

impl Ord for FrontierEdge {
    // Reversed, so the max-heap pops the lightest edge. Ties go to the edge pushed first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .partial_cmp(&self.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for FrontierEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Picks a minimum spanning tree of the candidate graph with Prim's algorithm, then keeps each
/// remaining candidate edge with probability `loop_chance`.
pub struct SpanningTreeSelector {
    loop_chance: f64,
}

impl Default for SpanningTreeSelector {
    fn default() -> Self {
        SpanningTreeSelector::new(DEFAULT_LOOP_CHANCE)
    }
}

impl SpanningTreeSelector {
    /// `loop_chance` is clamped into `[0, 1]`.
    pub fn new(loop_chance: f64) -> Self {
        SpanningTreeSelector {
            loop_chance: if loop_chance.is_nan() {
                0.0
            } else {
                loop_chance.max(0.0).min(1.0)
            },
        }
    }

    /// Returns the tree edges in the order Prim's algorithm adds them, plus the set of visited
    /// vertices.
    pub fn minimum_spanning_tree(
        &self,
        graph: &CandidateGraph,
        start: usize,
    ) -> (Vec<Edge>, Vec<bool>) {
        let g = graph.graph();
        let mut visited = vec![false; graph.vertex_count()];
        let mut tree = Vec::new();
        if start >= visited.len() {
            return (tree, visited);
        }

        let mut frontier = BinaryHeap::new();
        let mut pushed = 0;
        let mut visit =
            |v: usize, visited: &mut Vec<bool>, frontier: &mut BinaryHeap<FrontierEdge>| {
                visited[v] = true;
                for e in g.edges(graph.nodes[v]) {
                    let other = if g[e.source()] == v {
                        g[e.target()]
                    } else {
                        g[e.source()]
                    };
                    if !visited[other] {
                        frontier.push(FrontierEdge {
                            weight: *e.weight(),
                            order: pushed,
                            edge: Edge::new(v, other),
                            to: other,
                        });
                        pushed += 1;
                    }
                }
            };

        visit(start, &mut visited, &mut frontier);
        while let Some(FrontierEdge { edge, to, .. }) = frontier.pop() {
            if visited[to] {
                continue;
            }
            tree.push(edge);
            visit(to, &mut visited, &mut frontier);
        }

        (tree, visited)
    }

    pub fn select(&self, graph: &CandidateGraph, rng: &mut impl Rng) -> EdgeSelection {
        let start = match graph.edges().first() {
            Some(e) => e.a(),
            None => {
                return EdgeSelection {
                    unreached: (0..graph.vertex_count()).collect(),
                    ..EdgeSelection::default()
                }
            }
        };

        let (tree, visited) = self.minimum_spanning_tree(graph, start);
        let unreached: Vec<usize> = visited
            .iter()
            .enumerate()
            .filter(|(_, v)| !**v)
            .map(|(i, _)| i)
            .collect();

        let in_tree: FnvHashSet<Edge> = tree.iter().cloned().collect();
        let loop_chance = self.loop_chance;
        let loops: Vec<Edge> = graph
            .edges()
            .iter()
            .filter(|e| !in_tree.contains(e))
            .filter(|_| rng.gen_bool(loop_chance))
            .cloned()
            .collect();

        log::debug!(
            "Selected {} tree edges and {} loop edges out of {} candidates",
            tree.len(),
            loops.len(),
            graph.edges().len()
        );
        let selection = EdgeSelection {
            tree,
            loops,
            unreached,
        };
        log::debug!(
            "Selected graph = {:?}",
            Dot::with_config(&selection.to_graph(graph), &[Config::EdgeNoLabel])
        );

        selection
    }
}
