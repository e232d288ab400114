//! Solving a model uniquely.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, info};
use petgraph::EdgeType;

use crate::engine::ConstraintEngine;
use crate::error::{EngineError, SolveError};
use crate::graph::{EdgeId, PuzzleGraph, Weight};
use crate::model::{Assignment, ConstraintModel};

/// The weight of every edge, as found by the [`Driver`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    weights: BTreeMap<EdgeId, Weight>,
}

impl Solution {
    /// The solved weight of `edge`.
    pub fn weight(&self, edge: EdgeId) -> Option<Weight> {
        self.weights.get(&edge).copied()
    }

    /// All edge weights, ordered by edge id.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, Weight)> + '_ {
        self.weights.iter().map(|(edge, weight)| (*edge, *weight))
    }

    /// Number of solved edges.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the puzzle had no edges.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn from_assignment(model: &ConstraintModel, assignment: &Assignment) -> Result<Self, SolveError> {
        let weights = model.edge_variables()
            .map(|(var, edge)| {
                let value = assignment.value(var)
                    .ok_or_else(|| SolveError::Engine(format!("assignment has no value for edge {}", edge)))?;
                Weight::try_from(value)
                    .map(|weight| (edge, weight))
                    .map_err(|_| SolveError::WeightOutOfRange { edge, value })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self { weights })
    }
}

/// Runs a [`ConstraintEngine`] over an encoded puzzle and insists on exactly one solution.
///
/// Finding one assignment is not enough: the driver searches a second time with that assignment's edge weights forbidden
/// and fails with [`SolveError::AmbiguousSolution`] if anything turns up.
pub struct Driver<E: ConstraintEngine> {
    engine: E,
    time_limit: Option<Duration>,
}

impl<E: ConstraintEngine> Driver<E> {
    /// A driver whose two searches together may take at most `time_limit`, if given.
    pub fn new(engine: E, time_limit: Option<Duration>) -> Self {
        Self { engine, time_limit }
    }

    fn remaining(&self, started: Instant) -> Result<Option<Duration>, SolveError> {
        match self.time_limit {
            None => Ok(None),
            Some(limit) => match limit.checked_sub(started.elapsed()) {
                Some(left) if !left.is_zero() => Ok(Some(left)),
                _ => Err(SolveError::Timeout(limit)),
            },
        }
    }

    /// Find the unique solution of `model`.
    ///
    /// Fails with [`SolveError::NoSolution`] if the model is infeasible, [`SolveError::AmbiguousSolution`] if it has
    /// more than one solution and [`SolveError::Timeout`] if both searches together exceed the time limit.
    pub fn solve(&self, model: &ConstraintModel) -> Result<Solution, SolveError> {
        let started = Instant::now();

        let first = self.engine.solve(model, self.remaining(started)?)
            .map_err(|e| self.rescale(e))?
            .ok_or(SolveError::NoSolution)?;
        let solution = Solution::from_assignment(model, &first)?;
        debug!("found a solution after {:?}, checking it is the only one", started.elapsed());

        let excluding = model.excluding(&first);
        if let Some(second) = self.engine.solve(&excluding, self.remaining(started)?).map_err(|e| self.rescale(e))? {
            let other = Solution::from_assignment(model, &second)?;
            let differing = solution.iter()
                .filter_map(|(edge, weight)| other.weight(edge)
                    .filter(|other_weight| *other_weight != weight)
                    .map(|other_weight| (edge, weight, other_weight)))
                .collect_vec();
            return Err(SolveError::AmbiguousSolution { differing });
        }

        info!("solution proven unique in {:?}", started.elapsed());
        Ok(solution)
    }

    /// [`Self::solve`], then write every solved weight onto `graph`.
    ///
    /// The graph is only touched once uniqueness is established.
    pub fn solve_into<Ty: EdgeType>(&self, model: &ConstraintModel, graph: &mut PuzzleGraph<Ty>) -> Result<Solution, SolveError> {
        let solution = self.solve(model)?;
        for (edge, weight) in solution.iter() {
            graph.set_edge_weight(edge, weight)?;
        }

        Ok(solution)
    }

    // engines only see the time left, so report the limit as configured
    fn rescale(&self, error: EngineError) -> SolveError {
        match (SolveError::from(error), self.time_limit) {
            (SolveError::Timeout(_), Some(limit)) => SolveError::Timeout(limit),
            (other, _) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::engine::SatEngine;
    use crate::graph::{EdgeAttributes, VertexAttributes, VertexId};
    use crate::model::{Constraint, VarId, VarKind};

    use super::*;

    fn two_edges(fix_second: bool) -> ConstraintModel {
        let mut model = ConstraintModel::new();
        let a = model.new_var("a".to_string(), 1..=2, VarKind::EdgeWeight(EdgeId(0)));
        let b = model.new_var("b".to_string(), 1..=2, VarKind::EdgeWeight(EdgeId(1)));
        model.add("distinct".to_string(), Constraint::AllDifferent(vec![a, b]));
        if fix_second {
            model.add("b".to_string(), Constraint::Fix { var: b, value: 1 });
        }

        model
    }

    #[test]
    fn unique() {
        let solution = Driver::new(SatEngine, None).solve(&two_edges(true)).unwrap();
        assert_eq!(solution.iter().collect_vec(), vec![(EdgeId(0), 2), (EdgeId(1), 1)]);
    }

    #[test]
    fn ambiguous() {
        match Driver::new(SatEngine, None).solve(&two_edges(false)) {
            Err(SolveError::AmbiguousSolution { differing }) => {
                assert_eq!(differing.len(), 2);
                assert!(differing.iter().all(|(_, first, second)| first != second));
            }
            other => panic!("expected an ambiguous solution, got {:?}", other),
        }
    }

    #[test]
    fn auxiliary_variables_do_not_count() {
        let mut model = two_edges(true);
        // a trigger nothing constrains could be either 0 or 1
        model.new_trigger("free".to_string());
        assert!(Driver::new(SatEngine, None).solve(&model).is_ok());
    }

    #[test]
    fn infeasible() {
        let mut model = two_edges(true);
        model.add("contradiction".to_string(), Constraint::Fix { var: VarId(0), value: 1 });
        assert_eq!(Driver::new(SatEngine, None).solve(&model), Err(SolveError::NoSolution));
    }

    struct SlowEngine {
        calls: Cell<usize>,
    }

    impl ConstraintEngine for SlowEngine {
        fn solve(&self, _: &ConstraintModel, time_limit: Option<Duration>) -> Result<Option<Assignment>, EngineError> {
            self.calls.set(self.calls.get() + 1);
            Err(EngineError::TimedOut(time_limit.unwrap_or_default()))
        }
    }

    #[test]
    fn timeout() {
        let limit = Duration::from_millis(250);
        let engine = SlowEngine { calls: Cell::new(0) };
        let driver = Driver::new(engine, Some(limit));
        assert_eq!(driver.solve(&two_edges(true)), Err(SolveError::Timeout(limit)));
        assert_eq!(driver.engine.calls.get(), 1);
    }

    #[test]
    fn writes_weights_back() {
        let mut graph: PuzzleGraph = PuzzleGraph::new();
        for id in 0..3 {
            graph.add_vertex(VertexId(id), VertexAttributes::default()).unwrap();
        }
        graph.add_edge(VertexId(0), VertexId(1), EdgeAttributes::default()).unwrap();
        graph.add_edge(VertexId(1), VertexId(2), EdgeAttributes::default()).unwrap();

        Driver::new(SatEngine, None).solve_into(&two_edges(true), &mut graph).unwrap();
        assert!(graph.is_fully_weighted());
        assert_eq!(graph.edge_weight(EdgeId(0)), Ok(2));
        assert_eq!(graph.edge_weight(EdgeId(1)), Ok(1));
    }

    #[test]
    fn ambiguity_leaves_graph_untouched() {
        let mut graph: PuzzleGraph = PuzzleGraph::new();
        for id in 0..3 {
            graph.add_vertex(VertexId(id), VertexAttributes::default()).unwrap();
        }
        graph.add_edge(VertexId(0), VertexId(1), EdgeAttributes::default()).unwrap();
        graph.add_edge(VertexId(1), VertexId(2), EdgeAttributes::default()).unwrap();

        assert!(Driver::new(SatEngine, None).solve_into(&two_edges(false), &mut graph).is_err());
        assert!(graph.edges().all(|edge| edge.weight().is_none()));
    }
}
