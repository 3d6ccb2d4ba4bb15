use crate::{
    corridor::CorridorCarver,
    error::{GenerationError, GenerationWarning, GridError},
    graph::{
        component_count, CandidateGraph, EdgeSelection, SpanningTreeSelector, DEFAULT_LOOP_CHANCE,
    },
    grid::{grid_volume, CellState, VoxelGrid, MAX_GRID_EXTENT},
    room::{room_vertices, Room, RoomCenter, RoomPlacer, RoomSpec},
    sampling::{small_rng, SeedPolicy},
    spawn::{choose_spawn_center, SpawnMode},
    triangulation::{
        CandidateEdges, ConnectivityGraphBuilder, EdgeSource, TriangulationMode,
        DEFAULT_NEAREST_NEIGHBORS,
    },
    VoxelEncoder,
};

use ilattice3::Point;
use petgraph::dot::{Config, Dot};
use rand::Rng;
use serde::{Deserialize, Serialize};
use stats::OnlineStats;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GraphSpec {
    #[serde(default)]
    pub triangulation: TriangulationMode,
    #[serde(default = "default_nearest_neighbors")]
    pub nearest_neighbors: usize,
    #[serde(default = "default_loop_chance")]
    pub loop_chance: f64,
}

fn default_nearest_neighbors() -> usize {
    DEFAULT_NEAREST_NEIGHBORS
}

fn default_loop_chance() -> f64 {
    DEFAULT_LOOP_CHANCE
}

impl Default for GraphSpec {
    fn default() -> Self {
        GraphSpec {
            triangulation: TriangulationMode::default(),
            nearest_neighbors: DEFAULT_NEAREST_NEIGHBORS,
            loop_chance: DEFAULT_LOOP_CHANCE,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CorridorSpec {
    #[serde(default = "default_widen")]
    pub widen: bool,
    /// Cells one corridor search may expand before that corridor is given up.
    #[serde(default)]
    pub max_search_nodes: Option<usize>,
}

fn default_widen() -> bool {
    true
}

impl Default for CorridorSpec {
    fn default() -> Self {
        CorridorSpec {
            widen: true,
            max_search_nodes: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DungeonMapSpec {
    pub size: [i32; 3],
    /// Random placement attempts. Rejected attempts are not retried.
    pub room_count: usize,
    /// Only X and Z are used; rooms are one cell tall.
    pub max_room_size: [i32; 3],
    #[serde(default)]
    pub seed: SeedPolicy,
    /// Offered to the placer before any random room.
    #[serde(default)]
    pub preset_rooms: Vec<RoomSpec>,
    #[serde(default)]
    pub graph: GraphSpec,
    #[serde(default)]
    pub corridors: CorridorSpec,
}

impl DungeonMapSpec {
    pub fn from_ron_str(s: &str) -> Result<Self, GenerationError> {
        let spec: Self =
            ron::de::from_str(s).map_err(|e| GenerationError::ParseSpec(e.to_string()))?;
        spec.validate()?;

        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.size.iter().any(|d| *d < 0) {
            return Err(GenerationError::InvalidSpec(format!(
                "negative grid size {:?}",
                self.size
            )));
        }
        if grid_volume(&self.size.into()).is_none() {
            return Err(GenerationError::InvalidSpec(format!(
                "grid size {:?} is too large",
                self.size
            )));
        }
        let representable = -MAX_GRID_EXTENT..=MAX_GRID_EXTENT;
        for preset in self.preset_rooms.iter() {
            let mut coords = preset.origin.iter().chain(preset.size.iter());
            if coords.any(|c| !representable.contains(c)) {
                return Err(GenerationError::InvalidSpec(format!(
                    "preset room {:?} is outside the representable range",
                    preset
                )));
            }
        }
        if self.max_room_size[0] < 1 || self.max_room_size[2] < 1 {
            return Err(GenerationError::InvalidSpec(format!(
                "max room size {:?} must be at least 1 on X and Z",
                self.max_room_size
            )));
        }
        if self.graph.nearest_neighbors == 0 {
            return Err(GenerationError::InvalidSpec(
                "nearest neighbor fallback needs at least 1 neighbor".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.graph.loop_chance) {
            return Err(GenerationError::InvalidSpec(format!(
                "loop chance {} is not a probability",
                self.graph.loop_chance
            )));
        }

        let requested = self.requested_rooms();
        if requested > 0 && self.size.iter().any(|d| *d == 0) {
            return Err(GenerationError::EmptyVolume { requested });
        }

        Ok(())
    }

    /// Presets plus random attempts.
    pub fn requested_rooms(&self) -> usize {
        self.room_count + self.preset_rooms.len()
    }
}

/// What happened during the last generation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationReport {
    pub seed: u64,
    pub requested_rooms: usize,
    pub placed_rooms: usize,
    pub edge_source: EdgeSource,
    pub candidate_edges: usize,
    pub tree_edges: usize,
    pub loop_edges: usize,
    pub realized_corridors: usize,
    pub failed_corridors: usize,
    pub hallway_cells: usize,
    pub corridor_length_mean: f64,
    pub corridor_length_stddev: f64,
    /// Groups of rooms joined by realized corridors. 1 means every room is reachable.
    pub connected_groups: usize,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationReport {
    fn new(seed: u64, requested_rooms: usize) -> Self {
        GenerationReport {
            seed,
            requested_rooms,
            placed_rooms: 0,
            edge_source: EdgeSource::Nothing,
            candidate_edges: 0,
            tree_edges: 0,
            loop_edges: 0,
            realized_corridors: 0,
            failed_corridors: 0,
            hallway_cells: 0,
            corridor_length_mean: 0.0,
            corridor_length_stddev: 0.0,
            connected_groups: 0,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: GenerationWarning) {
        warning.log();
        self.warnings.push(warning);
    }
}

/// Owns the grid and everything derived from it. Each `generate` call throws away the previous
/// dungeon and runs placement, triangulation, tree selection and corridor carving once.
pub struct DungeonGenerator {
    spec: DungeonMapSpec,
    grid: VoxelGrid,
    rooms: Vec<Room>,
    candidates: Option<CandidateEdges>,
    selection: Option<EdgeSelection>,
    room_centers: Vec<RoomCenter>,
    report: Option<GenerationReport>,
}

impl DungeonGenerator {
    pub fn new(spec: DungeonMapSpec) -> Result<Self, GenerationError> {
        spec.validate()?;
        let grid = VoxelGrid::new(spec.size.into())?;

        Ok(DungeonGenerator {
            spec,
            grid,
            rooms: Vec::new(),
            candidates: None,
            selection: None,
            room_centers: Vec::new(),
            report: None,
        })
    }

    pub fn spec(&self) -> &DungeonMapSpec {
        &self.spec
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn cell_at(&self, p: &Point) -> Result<CellState, GridError> {
        self.grid.get(p)
    }

    pub fn in_bounds(&self, p: &Point) -> bool {
        self.grid.in_bounds(p)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Ground-level room centroids from the last pass, in placement order.
    pub fn room_centers(&self) -> &[RoomCenter] {
        &self.room_centers
    }

    pub fn candidates(&self) -> Option<&CandidateEdges> {
        self.candidates.as_ref()
    }

    pub fn selection(&self) -> Option<&EdgeSelection> {
        self.selection.as_ref()
    }

    pub fn report(&self) -> Option<&GenerationReport> {
        self.report.as_ref()
    }

    pub fn encode_into(&self, encoder: &mut impl VoxelEncoder) {
        self.grid.encode_into(encoder);
    }

    pub fn spawn_center(&self, mode: SpawnMode, rng: &mut impl Rng) -> Option<RoomCenter> {
        choose_spawn_center(&self.room_centers, mode, rng)
    }

    /// Forgets the whole dungeon.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.rooms.clear();
        self.candidates = None;
        self.selection = None;
        self.room_centers.clear();
        self.report = None;
    }

    /// Runs one full pass. `seed` overrides `DungeonMapSpec::seed` for this pass only. On failure
    /// the generator is left cleared.
    pub fn generate(&mut self, seed: Option<u64>) -> Result<&[RoomCenter], GenerationError> {
        let seed = seed.unwrap_or_else(|| self.spec.seed.resolve());
        self.clear();

        match self.run(seed) {
            Ok(report) => {
                self.report = Some(report);
                Ok(&self.room_centers)
            }
            Err(e) => {
                log::error!("Dungeon generation failed: {}", e);
                self.clear();
                Err(e)
            }
        }
    }

    fn run(&mut self, seed: u64) -> Result<GenerationReport, GenerationError> {
        log::debug!("Generating dungeon map with seed {}", seed);
        let mut rng = small_rng(seed);
        let requested = self.spec.requested_rooms();
        let mut report = GenerationReport::new(seed, requested);

        let presets: Vec<Room> = self.spec.preset_rooms.iter().map(RoomSpec::make).collect();
        let placement = RoomPlacer::new(self.spec.max_room_size.into()).place_rooms(
            self.spec.room_count,
            &presets,
            &mut self.grid,
            &mut rng,
        )?;
        if placement.rooms.is_empty() {
            return Err(GenerationError::NoRoomsPlaced {
                attempts: placement.attempts,
            });
        }
        if placement.rooms.len() < requested {
            report.warn(GenerationWarning::PlacementExhausted {
                requested,
                placed: placement.rooms.len(),
            });
        }
        self.rooms = placement.rooms;
        report.placed_rooms = self.rooms.len();

        let vertices = room_vertices(&self.rooms);
        let graph_spec = &self.spec.graph;
        let builder =
            ConnectivityGraphBuilder::new(graph_spec.triangulation, graph_spec.nearest_neighbors);
        let candidates = builder.build(&vertices)?;
        report.edge_source = candidates.source;
        if candidates.fell_back {
            report.warn(GenerationWarning::GraphDegenerate {
                rooms: vertices.len(),
            });
        }

        if candidates.edges.is_empty() {
            report.warn(GenerationWarning::TooFewRoomsForCorridors {
                rooms: vertices.len(),
            });
            report.connected_groups = vertices.len();
        } else {
            let graph = CandidateGraph::new(&vertices, &candidates.edges);
            log::debug!(
                "Candidate graph = {:?}",
                Dot::with_config(graph.graph(), &[Config::EdgeNoLabel])
            );
            report.candidate_edges = graph.edges().len();

            let selection =
                SpanningTreeSelector::new(self.spec.graph.loop_chance).select(&graph, &mut rng);
            report.tree_edges = selection.tree.len();
            report.loop_edges = selection.loops.len();
            if !selection.unreached.is_empty() {
                report.warn(GenerationWarning::DisconnectedCandidateGraph {
                    unreached: selection.unreached.clone(),
                });
            }

            let corridor_spec = &self.spec.corridors;
            let mut carver =
                CorridorCarver::new(corridor_spec.widen, corridor_spec.max_search_nodes);
            let corridors = carver.connect(&mut self.grid, &self.rooms, selection.selected())?;
            for (edge, reason) in corridors.failed.iter() {
                report.warn(GenerationWarning::PathNotFound {
                    edge: *edge,
                    reason: reason.clone(),
                });
            }

            report.realized_corridors = corridors.realized.len();
            report.failed_corridors = corridors.failed.len();
            report.hallway_cells = corridors.carved_cells;
            if !corridors.path_lengths.is_empty() {
                let mut lengths = OnlineStats::new();
                for len in corridors.path_lengths.iter() {
                    lengths.add(*len as f64);
                }
                report.corridor_length_mean = lengths.mean();
                report.corridor_length_stddev = lengths.stddev();
            }
            report.connected_groups = component_count(&graph.subgraph(corridors.realized.iter()));

            self.selection = Some(selection);
        }
        self.candidates = Some(candidates);

        self.record_room_centers();
        log::info!(
            "Generated {} rooms joined by {} corridors ({} hallway cells, {} warnings)",
            report.placed_rooms,
            report.realized_corridors,
            report.hallway_cells,
            report.warnings.len()
        );

        Ok(report)
    }

    fn record_room_centers(&mut self) {
        self.room_centers = self.rooms.iter().map(Room::floor_center).collect();
        log::debug!("Recorded {} room centers", self.room_centers.len());
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
