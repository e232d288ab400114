//! Translation of a puzzle into a constraint model.

use itertools::Itertools;
use log::debug;
use petgraph::algo::all_simple_paths;
use petgraph::EdgeType;

use crate::error::EncodeError;
use crate::graph::{EdgeId, PuzzleGraph, VertexId, Weight};
use crate::model::{Constraint, ConstraintModel, LinearSum, Relation, Value, VarId, VarKind};
use crate::rules::{Rule, RuleSet};

/// Translate a puzzle into a [`ConstraintModel`].
///
/// Every edge gets one variable, in edge order, ranging over `rules.weights`.
/// Then, in order:
/// 1. every edge hint fixes its variable,
/// 2. if `rules.distinct`, all edge variables are pairwise different,
/// 3. each rule of `rules.rules` adds its own constraints.
///
/// The result depends only on `graph` and `rules`, so encoding the same puzzle twice yields equal models.
/// Fails with [`EncodeError::InvalidRule`] if a rule names a vertex or edge the graph does not have.
pub fn encode<Ty: EdgeType>(graph: &PuzzleGraph<Ty>, rules: &RuleSet) -> Result<ConstraintModel, EncodeError> {
    let mut encoder = Encoder {
        graph,
        rules,
        model: ConstraintModel::new(),
        edge_vars: Vec::with_capacity(graph.edge_count()),
    };

    encoder.declare_edge_weights();
    encoder.given_weights();
    encoder.distinct_weights();

    for rule in &rules.rules {
        match *rule {
            Rule::FixedWeight { from, to, weight } => encoder.fixed_weight(rule, from, to, weight)?,
            Rule::IncidentSum { vertex, total } => encoder.incident_sum(rule, vertex, total)?,
            Rule::PathSum { vertex, total } => encoder.path_sum(rule, vertex, total)?,
        }
    }

    debug!("encoded {} rules into {} variables and {} constraints",
        rules.rules.len(), encoder.model.variables().len(), encoder.model.constraints().len());
    Ok(encoder.model)
}

struct Encoder<'a, Ty: EdgeType> {
    graph: &'a PuzzleGraph<Ty>,
    rules: &'a RuleSet,
    model: ConstraintModel,
    // indexed by edge id
    edge_vars: Vec<VarId>,
}

fn invalid(rule: &Rule, reason: String) -> EncodeError {
    EncodeError::InvalidRule { rule: rule.to_string(), reason }
}

impl<Ty: EdgeType> Encoder<'_, Ty> {
    fn edge_var(&self, edge: EdgeId) -> VarId {
        self.edge_vars[edge.0]
    }

    fn require_vertex(&self, rule: &Rule, vertex: VertexId) -> Result<(), EncodeError> {
        match self.graph.contains_vertex(vertex) {
            true => Ok(()),
            false => Err(invalid(rule, format!("vertex {} is not in the graph", vertex))),
        }
    }

    fn declare_edge_weights(&mut self) {
        let domain = Value::from(*self.rules.weights.start())..=Value::from(*self.rules.weights.end());
        for edge in self.graph.edges() {
            let (from, to) = edge.endpoints();
            let var = self.model.new_var(format!("w({}-{})", from, to), domain.clone(), VarKind::EdgeWeight(edge.id()));
            self.edge_vars.push(var);
        }
    }

    fn given_weights(&mut self) {
        for edge in self.graph.edges() {
            if let Some(hint) = edge.hint() {
                let (from, to) = edge.endpoints();
                self.model.add(
                    format!("given weight of {}-{}", from, to),
                    Constraint::Fix { var: self.edge_vars[edge.id().0], value: Value::from(hint) },
                );
            }
        }
    }

    fn distinct_weights(&mut self) {
        if self.rules.distinct {
            self.model.add("distinct weights".to_string(), Constraint::AllDifferent(self.edge_vars.clone()));
        }
    }

    fn fixed_weight(&mut self, rule: &Rule, from: VertexId, to: VertexId, weight: Weight) -> Result<(), EncodeError> {
        self.require_vertex(rule, from)?;
        self.require_vertex(rule, to)?;
        let edge = self.graph.find_edge(from, to)
            .ok_or_else(|| invalid(rule, format!("there is no edge {}-{}", from, to)))?;

        self.model.add(rule.to_string(), Constraint::Fix { var: self.edge_var(edge), value: Value::from(weight) });
        Ok(())
    }

    fn incident_sum(&mut self, rule: &Rule, vertex: VertexId, total: Weight) -> Result<(), EncodeError> {
        self.require_vertex(rule, vertex)?;
        let incident = self.graph.adjacent_edges(vertex)
            .map_err(|e| invalid(rule, e.to_string()))?;

        let vars = incident.into_iter().map(|edge| self.edge_var(edge)).collect_vec();
        self.model.add(rule.to_string(), Constraint::Linear {
            sum: LinearSum::of(vars, Relation::Eq, Value::from(total)),
            enforced_by: None,
        });
        Ok(())
    }

    fn path_sum(&mut self, rule: &Rule, vertex: VertexId, total: Weight) -> Result<(), EncodeError> {
        self.require_vertex(rule, vertex)?;
        let candidates = self.candidate_paths(vertex, self.max_path_edges(total));
        debug!("{} candidate paths for `{}`", candidates.len(), rule);

        // at least one candidate has the right total; a trigger per candidate picks which
        let mut triggers = Vec::with_capacity(candidates.len());
        for (index, path) in candidates.iter().enumerate() {
            let vars = path.iter().map(|edge| self.edge_var(*edge)).collect_vec();
            let trigger = self.model.new_trigger(format!("path {} of {} for `{}`", index, candidates.len(), rule));
            self.model.add(format!("{} (path {})", rule, index), Constraint::Linear {
                sum: LinearSum::of(vars, Relation::Eq, Value::from(total)),
                enforced_by: Some(trigger),
            });
            triggers.push(trigger);
        }

        self.model.add(rule.to_string(), Constraint::AnyOf(triggers));
        Ok(())
    }

    /// The most edges a path with weights summing to `total` can have.
    ///
    /// `k` edges weigh at least `k * lo`, or `k * lo + k(k - 1) / 2` if weights are distinct.
    /// A simple path never has more than `|V| - 1` edges.
    fn max_path_edges(&self, total: Weight) -> usize {
        let low = u64::from(*self.rules.weights.start());
        let distinct = self.rules.distinct;
        let lightest = |edges: u64| match distinct {
            true => edges * low + edges * edges.saturating_sub(1) / 2,
            false => edges * low,
        };

        (1..self.graph.node_count())
            .take_while(|edges| lightest(*edges as u64) <= u64::from(total))
            .last()
            .unwrap_or(0)
    }

    /// Every simple path leaving `vertex` with between 1 and `max_edges` edges, as edge lists.
    ///
    /// Ordered by end vertex, then in petgraph's enumeration order, which follows edge insertion order.
    fn candidate_paths(&self, vertex: VertexId, max_edges: usize) -> Vec<Vec<EdgeId>> {
        if max_edges == 0 {
            return Vec::new();
        }

        self.graph.vertices()
            .map(|end| end.id())
            .filter(|end| *end != vertex)
            .flat_map(|end| all_simple_paths::<Vec<VertexId>, _>(self.graph.topology(), vertex, end, 0, Some(max_edges - 1)))
            .filter_map(|vertices| vertices.iter()
                .tuple_windows()
                .map(|(a, b)| self.graph.find_edge(*a, *b))
                .collect::<Option<Vec<_>>>())
            .collect_vec()
    }
}
