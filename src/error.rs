use crate::graph::Edge;

use ilattice3::Point;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GridError {
    #[error("{point:?} is outside of the grid volume {size:?}")]
    OutOfBounds { point: Point, size: Point },
    #[error("grid size {size:?} is too large")]
    TooLarge { size: Point },
}

/// Conditions that abort a generation pass.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid dungeon spec: {0}")]
    InvalidSpec(String),
    #[error("cannot place {requested} rooms in a zero-size volume")]
    EmptyVolume { requested: usize },
    #[error("none of the {attempts} room placement attempts succeeded")]
    NoRoomsPlaced { attempts: usize },
    #[error("no candidate edges between {rooms} rooms, even after the nearest neighbor fallback")]
    GraphDegenerate { rooms: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("failed to parse dungeon spec: {0}")]
    ParseSpec(String),
}

/// Degradations that are logged and collected, but never abort a pass.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationWarning {
    #[error("placed {placed} of {requested} requested rooms")]
    PlacementExhausted { requested: usize, placed: usize },
    #[error("triangulation of {rooms} room centers was degenerate; used nearest neighbors")]
    GraphDegenerate { rooms: usize },
    #[error("only {rooms} rooms placed; skipping corridors")]
    TooFewRoomsForCorridors { rooms: usize },
    #[error("rooms {unreached:?} are not reachable in the candidate graph")]
    DisconnectedCandidateGraph { unreached: Vec<usize> },
    #[error("no corridor between rooms {} and {}: {reason}", .edge.a(), .edge.b())]
    PathNotFound { edge: Edge, reason: PathError },
}

impl GenerationWarning {
    pub fn log(&self) {
        log::warn!("{}", self);
    }
}

/// Why a single corridor search gave up.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PathError {
    #[error("goal is unreachable")]
    Unreachable,
    #[error("gave up after expanding {expanded} cells")]
    BudgetExhausted { expanded: usize },
    #[error(transparent)]
    Endpoint(#[from] GridError),
}
