//! Error types, one per stage.

use std::time::Duration;

use thiserror::Error;

use crate::graph::{EdgeId, VertexId, Weight};

/// Reasons an operation on a [`PuzzleGraph`](crate::graph::PuzzleGraph) may fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A vertex with this id was already added.
    #[error("vertex {0} already exists")]
    DuplicateVertex(VertexId),
    /// An operation referenced a vertex which was never added.
    #[error("vertex {0} does not exist")]
    UnknownVertex(VertexId),
    /// An edge between these endpoints already exists; puzzle graphs have no parallel edges.
    #[error("edge {from}-{to} already exists")]
    DuplicateEdge {
        /// First endpoint as given.
        from: VertexId,
        /// Second endpoint as given.
        to: VertexId,
    },
    /// An operation referenced an edge id the graph never handed out.
    #[error("edge {0} does not exist")]
    UnknownEdge(EdgeId),
    /// The weight of this edge was read before the solver assigned it.
    #[error("weight of edge {0} has not been resolved")]
    UnresolvedWeight(EdgeId),
    /// The weight of this edge was already written; weights are written exactly once.
    #[error("weight of edge {0} was already resolved")]
    WeightAlreadyResolved(EdgeId),
}

/// Reasons [`encode`](crate::encoder::encode) may refuse a rule set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A rule references a vertex or edge absent from the graph.
    #[error("invalid rule `{rule}`: {reason}")]
    InvalidRule {
        /// The offending rule, as displayed.
        rule: String,
        /// What the rule refers to that is missing.
        reason: String,
    },
}

/// Failures reported by a [`ConstraintEngine`](crate::engine::ConstraintEngine).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The search did not finish within the allotted time.
    #[error("search exceeded {0:?}")]
    TimedOut(Duration),
    /// The backing solver failed for a reason of its own.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Reasons the [`Driver`](crate::solver::Driver) may fail.
///
/// None of these are transient; every one of them means the encoding, the topology or the time limit is wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// No assignment satisfies every constraint.
    #[error("constraint model is infeasible")]
    NoSolution,
    /// At least two assignments satisfy every constraint; `differing` lists the edges on which the first two disagree.
    #[error("constraint model has more than one solution (edges {differing:?} differ)")]
    AmbiguousSolution {
        /// `(edge, weight in the first solution, weight in the second)`.
        differing: Vec<(EdgeId, Weight, Weight)>,
    },
    /// The search exceeded the configured time limit.
    #[error("solver exceeded the time limit of {0:?}")]
    Timeout(Duration),
    /// The constraint engine failed for a reason other than time.
    #[error("constraint engine failed: {0}")]
    Engine(String),
    /// A solved edge variable holds a value no edge weight can take.
    #[error("solved value {value} of edge {edge} is not a valid weight")]
    WeightOutOfRange {
        /// The edge whose variable was solved.
        edge: EdgeId,
        /// The value found.
        value: i64,
    },
    /// Writing a solved weight onto the graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<EngineError> for SolveError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::TimedOut(limit) => Self::Timeout(limit),
            EngineError::Backend(reason) => Self::Engine(reason),
        }
    }
}

/// Reasons the path decoder may fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The source and target are not connected in the solved graph.
    #[error("no path from vertex {start} to vertex {end}")]
    NoPath {
        /// The requested source.
        start: VertexId,
        /// The requested target.
        end: VertexId,
    },
    /// An edge on the path carries a weight the table has no symbol for.
    #[error("weight {weight} of edge {edge} has no entry in the weight table")]
    UnmappedWeight {
        /// The edge carrying the weight.
        edge: EdgeId,
        /// The weight without a symbol.
        weight: Weight,
    },
    /// An endpoint is unknown or a weight on the way is unresolved.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Any failure of the whole pipeline, tagged with the stage it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The rules did not fit the graph.
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
    /// No unique solution was found in time.
    #[error("solving failed: {0}")]
    Solve(#[from] SolveError),
    /// The solved graph could not be read.
    #[error("decoding failed: {0}")]
    Decode(#[from] DecodeError),
}
