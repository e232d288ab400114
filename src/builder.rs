//! Chained construction of puzzles.

use std::ops::RangeInclusive;

use petgraph::{EdgeType, Undirected};

use crate::error::GraphError;
use crate::graph::{EdgeAttributes, PuzzleGraph, VertexAttributes, VertexId, Weight};
use crate::path::WeightTable;
use crate::puzzle::Puzzle;
use crate::rules::{Rule, RuleSet};

/// Reasons a builder may become invalid while building.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// The graph refused a vertex or edge, e.g. because it was added twice or joins an unknown vertex.
    Graph(GraphError),
    /// [`PuzzleBuilder::route`] was never called.
    MissingRoute,
    /// The route starts or ends at a vertex the graph does not have.
    UnknownRouteVertex(VertexId),
}

/// Assembles a [`Puzzle`] one vertex, edge and rule at a time.
///
/// Every method records problems instead of failing on the spot, so calls can be chained freely;
/// [`Self::build`] reports everything that went wrong.
/// Builders can be [`Clone`]d to save their state at some point.
#[derive(Clone)]
pub struct PuzzleBuilder<Ty: EdgeType = Undirected> {
    graph: PuzzleGraph<Ty>,
    rules: RuleSet,
    route: Option<(VertexId, VertexId)>,
    table: WeightTable,
    invalid: Vec<BuilderInvalidReason>,
}

impl<Ty: EdgeType + Clone> PuzzleBuilder<Ty> {
    /// Start an empty puzzle whose edge weights lie in `weights`. Weights decode through [`WeightTable::alphabet`] unless
    /// [`Self::table`] says otherwise.
    pub fn with_weights(weights: RangeInclusive<Weight>) -> Self {
        Self {
            graph: PuzzleGraph::new(),
            rules: RuleSet::new(weights),
            route: None,
            table: WeightTable::alphabet(),
            invalid: Vec::new(),
        }
    }

    fn record(&mut self, result: Result<(), GraphError>) -> &mut Self {
        if let Err(e) = result {
            self.invalid.push(BuilderInvalidReason::Graph(e));
        }
        self
    }

    /// Add unlabelled vertices.
    pub fn vertices(&mut self, ids: impl IntoIterator<Item = VertexId>) -> &mut Self {
        for id in ids {
            let result = self.graph.add_vertex(id, VertexAttributes::default());
            self.record(result);
        }
        self
    }

    /// Add a vertex carrying a display label.
    pub fn labelled_vertex(&mut self, id: VertexId, label: &str) -> &mut Self {
        let result = self.graph.add_vertex(id, VertexAttributes { label: Some(label.to_string()) });
        self.record(result)
    }

    /// Add an edge of unknown weight. Both endpoints must already be present.
    pub fn edge(&mut self, from: VertexId, to: VertexId) -> &mut Self {
        let result = self.graph.add_edge(from, to, EdgeAttributes::default()).map(|_| ());
        self.record(result)
    }

    /// Add an edge whose weight the puzzle gives away.
    pub fn given_edge(&mut self, from: VertexId, to: VertexId, weight: Weight) -> &mut Self {
        let result = self.graph.add_edge(from, to, EdgeAttributes::given(weight)).map(|_| ());
        self.record(result)
    }

    /// Require all edge weights to differ.
    pub fn distinct(&mut self) -> &mut Self {
        self.rules.distinct = true;
        self
    }

    /// Append a rule. Rules are checked against the graph at encoding time, not here.
    pub fn rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.rules.push(rule);
        self
    }

    /// Shorthand for one [`Rule::PathSum`] per total.
    pub fn path_sums(&mut self, vertex: VertexId, totals: impl IntoIterator<Item = Weight>) -> &mut Self {
        for total in totals {
            self.rule(Rule::PathSum { vertex, total });
        }
        self
    }

    /// Set the endpoints of the path spelling out the answer.
    pub fn route(&mut self, source: VertexId, target: VertexId) -> &mut Self {
        self.route = Some((source, target));
        self
    }

    /// Replace the weight-to-character table.
    pub fn table(&mut self, table: WeightTable) -> &mut Self {
        self.table = table;
        self
    }

    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        match self.invalid.is_empty() {
            true => None,
            false => Some(&self.invalid),
        }
    }

    /// Convert the state of this builder into a [`Puzzle`].
    pub fn build(&self) -> Result<Puzzle<Ty>, Vec<BuilderInvalidReason>> {
        let mut invalid = self.invalid.clone();
        match self.route {
            None => invalid.push(BuilderInvalidReason::MissingRoute),
            Some((source, target)) => {
                invalid.extend([source, target].into_iter()
                    .filter(|vertex| !self.graph.contains_vertex(*vertex))
                    .map(BuilderInvalidReason::UnknownRouteVertex));
            }
        }

        match (invalid.is_empty(), self.route) {
            (true, Some((source, target))) => Ok(Puzzle::new(self.graph.clone(), self.rules.clone(), source, target, self.table.clone())),
            _ => Err(invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use petgraph::Directed;

    use crate::graph::EdgeId;

    use super::*;

    #[test]
    fn valid() {
        let puzzle = PuzzleBuilder::<Undirected>::with_weights(1..=3)
            .vertices((0..3).map(VertexId))
            .edge(VertexId(0), VertexId(1))
            .given_edge(VertexId(1), VertexId(2), 3)
            .distinct()
            .rule(Rule::IncidentSum { vertex: VertexId(1), total: 5 })
            .path_sums(VertexId(0), [1, 5])
            .route(VertexId(0), VertexId(2))
            .build()
            .unwrap();

        assert_eq!(puzzle.graph().node_count(), 3);
        assert_eq!(puzzle.graph().edge(EdgeId(1)).unwrap().hint(), Some(3));
        assert!(puzzle.rules().distinct);
        assert_eq!(puzzle.rules().rules.len(), 3);
        assert_eq!((puzzle.source(), puzzle.target()), (VertexId(0), VertexId(2)));
    }

    fn triangle<Ty: EdgeType + Clone>() -> PuzzleBuilder<Ty> {
        let mut builder = PuzzleBuilder::with_weights(1..=3);
        builder
            .vertices((0..3).map(VertexId))
            .edge(VertexId(0), VertexId(1))
            .edge(VertexId(1), VertexId(2))
            .edge(VertexId(2), VertexId(0))
            .route(VertexId(0), VertexId(2));

        builder
    }

    #[test]
    fn builds_for_either_direction() {
        let directed = triangle::<Directed>().build().unwrap();
        assert!(directed.graph().is_directed());
        assert_eq!(directed.graph().find_edge(VertexId(0), VertexId(2)), None);

        let undirected = triangle::<Undirected>().build().unwrap();
        assert!(!undirected.graph().is_directed());
        assert_eq!(undirected.graph().find_edge(VertexId(0), VertexId(2)), Some(EdgeId(2)));
    }

    #[test]
    fn clones_keep_their_state() {
        let mut first = triangle::<Directed>();
        let saved = first.clone();
        first.given_edge(VertexId(0), VertexId(2), 3);

        assert_eq!(first.build().unwrap().graph().edge_count(), 4);
        assert_eq!(saved.build().unwrap().graph().edge_count(), 3);
        let puzzle = saved.build().unwrap();
        let copy = puzzle.clone();
        assert_eq!(copy.graph().edge_count(), puzzle.graph().edge_count());
    }

    #[test]
    fn invalid() {
        let mut builder = PuzzleBuilder::<Directed>::with_weights(1..=3);
        builder
            .vertices([VertexId(0), VertexId(1), VertexId(1)])
            .edge(VertexId(0), VertexId(5));
        assert_eq!(builder.is_valid().map(|reasons| reasons.len()), Some(2));

        assert_eq!(builder.build().err(), Some(vec![
            BuilderInvalidReason::Graph(GraphError::DuplicateVertex(VertexId(1))),
            BuilderInvalidReason::Graph(GraphError::UnknownVertex(VertexId(5))),
            BuilderInvalidReason::MissingRoute,
        ]));

        builder.route(VertexId(0), VertexId(7));
        assert_eq!(builder.build().err().and_then(|reasons| reasons.last().cloned()), Some(BuilderInvalidReason::UnknownRouteVertex(VertexId(7))));
    }
}
