//! Puzzles, the solving pipeline, and the built-in instance.

use std::fmt::{Display, Formatter};

use log::info;
use petgraph::{EdgeType, Undirected};

use crate::builder::{BuilderInvalidReason, PuzzleBuilder};
use crate::config::SolveConfig;
use crate::encoder::encode;
use crate::engine::{ConstraintEngine, SatEngine};
use crate::error::PipelineError;
use crate::graph::{PuzzleGraph, VertexId};
use crate::path::{decode, describe, shortest_path, LexicographicDijkstra, Path, ShortestPathEngine, WeightTable};
use crate::rules::{Rule, RuleSet};
use crate::solver::Driver;

/// A puzzle ready to be solved: the graph with its hints, the rules, and where the answer path runs.
#[derive(Clone, Debug)]
pub struct Puzzle<Ty: EdgeType = Undirected> {
    graph: PuzzleGraph<Ty>,
    rules: RuleSet,
    source: VertexId,
    target: VertexId,
    table: WeightTable,
}

impl<Ty: EdgeType> Puzzle<Ty> {
    /// Assemble a puzzle from its parts. Prefer [`PuzzleBuilder`] for anything written by hand.
    pub fn new(graph: PuzzleGraph<Ty>, rules: RuleSet, source: VertexId, target: VertexId, table: WeightTable) -> Self {
        Self { graph, rules, source, target, table }
    }

    /// The graph with its hints, weights still unresolved.
    pub fn graph(&self) -> &PuzzleGraph<Ty> {
        &self.graph
    }

    /// The rules the edge weights obey.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Where the answer path starts.
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Where the answer path ends.
    pub fn target(&self) -> VertexId {
        self.target
    }

    /// Solves this puzzle with [`SatEngine`] and [`LexicographicDijkstra`], consuming it and returning the weighted graph
    /// together with the answer.
    pub fn solve(self, config: &SolveConfig) -> Result<SolvedPuzzle<Ty>, PipelineError> {
        self.solve_with(config, &SatEngine, &LexicographicDijkstra)
    }

    /// Encode, solve uniquely, write the weights back, then decode the shortest `source`-`target` path.
    ///
    /// The stages run strictly in that order and the first failure is returned, tagged with its stage.
    pub fn solve_with<E, P>(mut self, config: &SolveConfig, engine: &E, paths: &P) -> Result<SolvedPuzzle<Ty>, PipelineError>
    where
        E: ConstraintEngine,
        P: ShortestPathEngine,
    {
        let model = encode(&self.graph, &self.rules)?;
        info!("encoded {} edges into {} variables and {} constraints",
            self.graph.edge_count(), model.variables().len(), model.constraints().len());

        Driver::new(engine, config.time_limit).solve_into(&model, &mut self.graph)?;

        let path = shortest_path(&self.graph, self.source, self.target, paths)?;
        let message = decode(&path, &self.table)?;
        info!("shortest path {} weighs {} and reads {:?}", describe(&path), path.total(), message);

        Ok(SolvedPuzzle { graph: self.graph, path, message })
    }
}

/// The outcome of [`Puzzle::solve`].
#[derive(Clone, Debug)]
pub struct SolvedPuzzle<Ty: EdgeType = Undirected> {
    graph: PuzzleGraph<Ty>,
    path: Path,
    message: String,
}

impl<Ty: EdgeType> SolvedPuzzle<Ty> {
    /// The puzzle graph with every edge weight resolved.
    pub fn graph(&self) -> &PuzzleGraph<Ty> {
        &self.graph
    }

    /// The shortest path from source to target in the solved graph.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The decoded answer.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<Ty: EdgeType> Display for SolvedPuzzle<Ty> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "path: {} (total {})", describe(&self.path), self.path.total())?;
        writeln!(f, "message: {}", self.message)
    }
}

/// Jane Street's "Bug Byte" puzzle (June 2024).
///
/// 18 vertices and 24 edges with weights 1 to 24, each used once.
/// Four weights are printed on the board, ten vertices state the sum of their incident edges and
/// four vertices state totals of paths leaving them. The answer is spelled by the shortest path from 3 to 17.
pub fn bug_byte() -> Result<Puzzle, Vec<BuilderInvalidReason>> {
    const EDGES: [(u32, u32); 24] = [
        (0, 1), (0, 2), (1, 3), (2, 3), (2, 7), (3, 8), (4, 7), (5, 9),
        (6, 8), (7, 9), (8, 9), (7, 10), (8, 11), (9, 10), (9, 11), (10, 13),
        (11, 14), (10, 12), (10, 15), (11, 16), (13, 15), (13, 16), (15, 17), (16, 17),
    ];
    const GIVEN: [((u32, u32), u32); 4] = [((2, 3), 12), ((8, 11), 20), ((9, 10), 24), ((10, 15), 7)];
    const INCIDENT_SUMS: [(u32, u32); 10] = [(0, 17), (1, 3), (7, 54), (8, 49), (9, 60), (10, 79), (11, 75), (13, 29), (15, 39), (16, 25)];
    const PATH_SUMS: [(u32, &[u32]); 4] = [(2, &[19, 23]), (4, &[31]), (5, &[6, 9, 16]), (6, &[8])];

    let mut builder: PuzzleBuilder = PuzzleBuilder::with_weights(1..=24);
    builder.vertices((0..18).map(VertexId)).distinct();

    for (from, to) in EDGES {
        match GIVEN.iter().find(|(edge, _)| *edge == (from, to)) {
            Some((_, weight)) => builder.given_edge(VertexId(from), VertexId(to), *weight),
            None => builder.edge(VertexId(from), VertexId(to)),
        };
    }
    for (vertex, total) in INCIDENT_SUMS {
        builder.rule(Rule::IncidentSum { vertex: VertexId(vertex), total });
    }
    for (vertex, totals) in PATH_SUMS {
        builder.path_sums(VertexId(vertex), totals.iter().copied());
    }

    builder.route(VertexId(3), VertexId(17)).build()
}
