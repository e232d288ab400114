//! Puzzle rules.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use crate::graph::{VertexId, Weight};

/// A single puzzle rule, already transcribed from the puzzle text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Rule {
    /// The edge between `from` and `to` has weight `weight`.
    FixedWeight {
        /// One endpoint.
        from: VertexId,
        /// The other endpoint.
        to: VertexId,
        /// The required weight.
        weight: Weight,
    },
    /// The weights of all edges incident to `vertex` sum to `total`.
    IncidentSum {
        /// The vertex whose edges are summed.
        vertex: VertexId,
        /// The required sum.
        total: Weight,
    },
    /// Some non-self-intersecting path starting at `vertex` has edge weights summing to `total`.
    ///
    /// Several of these on one vertex are independent; their paths may overlap.
    PathSum {
        /// Where the path starts.
        vertex: VertexId,
        /// The required sum.
        total: Weight,
    },
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::FixedWeight { from, to, weight } => write!(f, "weight of {from}-{to} is {weight}"),
            Rule::IncidentSum { vertex, total } => write!(f, "edges at {vertex} sum to {total}"),
            Rule::PathSum { vertex, total } => write!(f, "a path from {vertex} sums to {total}"),
        }
    }
}

/// Everything the solver needs to know about a puzzle besides its topology.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSet {
    /// The range every edge weight lies in.
    pub weights: RangeInclusive<Weight>,
    /// Whether every edge weight must be used at most once.
    pub distinct: bool,
    /// Vertex and edge specific rules, encoded in this order.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// A rule set with no rules besides every weight lying in `weights`.
    pub fn new(weights: RangeInclusive<Weight>) -> Self {
        Self {
            weights,
            distinct: false,
            rules: Vec::new(),
        }
    }

    /// Require all edge weights to differ.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append a rule.
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append several rules, in order.
    pub fn with_all(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }
}
