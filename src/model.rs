//! Constraint models independent of any search backend.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use itertools::Itertools;
use strum::{Display as StrumDisplay, VariantArray};

use crate::graph::EdgeId;

/// Values taken by decision variables.
pub type Value = i64;

/// Index of a variable inside its [`ConstraintModel`].
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of this variable in [`ConstraintModel::variables`].
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a decision variable stands for.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum VarKind {
    /// The weight of an edge. Only these take part in the uniqueness check.
    EdgeWeight(EdgeId),
    /// An auxiliary boolean selecting one alternative of a disjunction.
    Trigger,
}

/// An integer unknown with a bounded domain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variable {
    /// Human-readable name, used when printing the model.
    pub name: String,
    /// Every value this variable may take.
    pub domain: RangeInclusive<Value>,
    /// Whether this is an edge weight or an auxiliary trigger.
    pub kind: VarKind,
}

/// Comparison between a linear sum and its right-hand side.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, StrumDisplay, VariantArray)]
pub enum Relation {
    /// Equal to.
    #[strum(to_string = "==")]
    Eq,
    /// At most.
    #[strum(to_string = "<=")]
    Le,
    /// At least.
    #[strum(to_string = ">=")]
    Ge,
}

impl Relation {
    /// Whether `lhs <relation> rhs` holds.
    pub fn holds(&self, lhs: Value, rhs: Value) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
        }
    }
}

/// `sum(coefficient * variable) <relation> rhs`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinearSum {
    /// `(coefficient, variable)` pairs.
    pub terms: Vec<(Value, VarId)>,
    /// How the sum compares to `rhs`.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: Value,
}

impl LinearSum {
    /// A sum of `vars`, each with coefficient 1.
    pub fn of(vars: impl IntoIterator<Item = VarId>, relation: Relation, rhs: Value) -> Self {
        Self {
            terms: vars.into_iter().map(|var| (1, var)).collect_vec(),
            relation,
            rhs,
        }
    }
}

/// A relation over decision variables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// `var == value`
    Fix {
        /// The fixed variable.
        var: VarId,
        /// Its only allowed value.
        value: Value,
    },
    /// No two of these variables share a value.
    AllDifferent(Vec<VarId>),
    /// A linear (in)equality, which only has to hold when `enforced_by` is 1 if present.
    Linear {
        /// The sum and its bound.
        sum: LinearSum,
        /// Trigger guarding the sum; `None` enforces it unconditionally.
        enforced_by: Option<VarId>,
    },
    /// At least one of these boolean variables is 1.
    AnyOf(Vec<VarId>),
    /// Not every variable takes the paired value at once.
    Forbid(Vec<(VarId, Value)>),
}

/// A [`Constraint`] together with the name of the rule that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamedConstraint {
    /// The rule this constraint came from.
    pub name: String,
    /// The constraint itself.
    pub constraint: Constraint,
}

/// A value for every variable of a model, indexed by [`VarId`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment(pub(crate) Vec<Value>);

impl Assignment {
    /// Build an assignment from values listed in variable order.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// The value of `var`, if it belongs to the assignment.
    pub fn value(&self, var: VarId) -> Option<Value> {
        self.0.get(var.0).copied()
    }

    /// Number of variables assigned.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A complete constraint-satisfaction problem: variables with bounded domains plus the constraints over them.
///
/// Built once by [`encode`](crate::encoder::encode) and never changed afterwards;
/// [`Self::excluding`] derives a new model rather than mutating this one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConstraintModel {
    variables: Vec<Variable>,
    constraints: Vec<NamedConstraint>,
}

impl ConstraintModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_var(&mut self, name: String, domain: RangeInclusive<Value>, kind: VarKind) -> VarId {
        self.variables.push(Variable { name, domain, kind });
        VarId(self.variables.len() - 1)
    }

    pub(crate) fn new_trigger(&mut self, name: String) -> VarId {
        self.new_var(name, 0..=1, VarKind::Trigger)
    }

    pub(crate) fn add(&mut self, name: String, constraint: Constraint) {
        self.constraints.push(NamedConstraint { name, constraint });
    }

    /// All variables in creation order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All constraints in creation order.
    pub fn constraints(&self) -> &[NamedConstraint] {
        &self.constraints
    }

    /// Look up a variable by id.
    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var.0)
    }

    /// The variable holding the weight of each edge, in variable order.
    pub fn edge_variables(&self) -> impl Iterator<Item = (VarId, EdgeId)> + '_ {
        self.variables.iter()
            .enumerate()
            .filter_map(|(index, var)| match var.kind {
                VarKind::EdgeWeight(edge) => Some((VarId(index), edge)),
                VarKind::Trigger => None,
            })
    }

    /// A copy of this model which additionally rules out the edge weights chosen by `assignment`.
    ///
    /// Auxiliary variables are left free, so only a genuinely different set of edge weights satisfies the result.
    pub fn excluding(&self, assignment: &Assignment) -> Self {
        let mut derived = self.clone();
        let forbidden = self.edge_variables()
            .filter_map(|(var, _)| assignment.value(var).map(|value| (var, value)))
            .collect_vec();
        derived.add("exclude previous solution".to_string(), Constraint::Forbid(forbidden));
        derived
    }

    /// Check `assignment` against every domain and constraint of this model.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        if assignment.len() != self.variables.len() {
            return false;
        }

        let value = |var: &VarId| assignment.0[var.0];

        let in_domains = self.variables.iter()
            .zip(assignment.0.iter())
            .all(|(var, value)| var.domain.contains(value));

        in_domains && self.constraints.iter().all(|named| match &named.constraint {
            Constraint::Fix { var, value: fixed } => value(var) == *fixed,
            Constraint::AllDifferent(vars) => vars.iter().map(value).all_unique(),
            Constraint::Linear { sum, enforced_by } => {
                enforced_by.is_some_and(|trigger| value(&trigger) == 0)
                    || sum.relation.holds(sum.terms.iter().map(|(coefficient, var)| coefficient * value(var)).sum(), sum.rhs)
            }
            Constraint::AnyOf(vars) => vars.iter().any(|var| value(var) == 1),
            Constraint::Forbid(pairs) => !pairs.iter().all(|(var, forbidden)| value(var) == *forbidden),
        })
    }
}

impl Display for ConstraintModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} variables, {} constraints", self.variables.len(), self.constraints.len())?;
        for named in &self.constraints {
            let name = |var: &VarId| self.variables[var.0].name.as_str();
            match &named.constraint {
                Constraint::Fix { var, value } => writeln!(f, "{}: {} == {}", named.name, name(var), value)?,
                Constraint::AllDifferent(vars) => writeln!(f, "{}: all different({})", named.name, vars.iter().map(name).join(", "))?,
                Constraint::Linear { sum, enforced_by } => {
                    let lhs = sum.terms.iter()
                        .map(|(coefficient, var)| if *coefficient == 1 { name(var).to_string() } else { format!("{}*{}", coefficient, name(var)) })
                        .join(" + ");
                    match enforced_by {
                        Some(trigger) => writeln!(f, "{}: {} => {} {} {}", named.name, name(trigger), lhs, sum.relation, sum.rhs)?,
                        None => writeln!(f, "{}: {} {} {}", named.name, lhs, sum.relation, sum.rhs)?,
                    }
                }
                Constraint::AnyOf(vars) => writeln!(f, "{}: any of({})", named.name, vars.iter().map(name).join(", "))?,
                Constraint::Forbid(pairs) => writeln!(f, "{}: not({})", named.name, pairs.iter().map(|(var, value)| format!("{} == {}", name(var), value)).join(" and "))?,
            }
        }

        Ok(())
    }
}
