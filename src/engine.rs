//! Constraint engines: the search backend behind the [`Driver`](crate::solver::Driver).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use itertools::Itertools;
use log::debug;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver};

use crate::error::EngineError;
use crate::logic::{at_most_one, exactly_one};
use crate::model::{Assignment, Constraint, ConstraintModel, LinearSum, Relation, Value, VarId};

/// The boundary between the solver driver and whatever performs the actual search.
///
/// Implementations return `Ok(None)` when the model is infeasible and must respect `time_limit` when one is given.
pub trait ConstraintEngine {
    /// Find any assignment satisfying every constraint of `model`.
    fn solve(&self, model: &ConstraintModel, time_limit: Option<Duration>) -> Result<Option<Assignment>, EngineError>;
}

impl<E: ConstraintEngine + ?Sized> ConstraintEngine for &E {
    fn solve(&self, model: &ConstraintModel, time_limit: Option<Duration>) -> Result<Option<Assignment>, EngineError> {
        (**self).solve(model, time_limit)
    }
}

/// A [`ConstraintEngine`] which translates the model into CNF and hands it to [`varisat`].
///
/// # Encoding
/// Every variable X with domain `lo..=hi` becomes `hi - lo + 1` literals `X=v`, exactly one of which is true.
///
/// A linear constraint `c_1 X_1 + ... + c_n X_n <relation> rhs` is unrolled into partial sums S_1, ..., S_n.
/// `S_i=r` is a literal stating the first `i` terms sum to `r`; we only ever force these upward,
/// `S_{i-1}=a` and `X_i=b` imply `S_i=a+c_i b`, which is enough since exactly one value of each X is true.
/// Any partial sum from which the remaining terms can no longer reach the right hand side is cut off instead:
/// `S_{i-1}=a` and `X_i=b` imply false (or, for a conditional constraint, imply its trigger is false).
///
/// # Time limits
/// With a limit, the search runs on its own thread and [`EngineError::TimedOut`] is returned once the limit passes.
/// varisat cannot be interrupted, so that thread keeps searching in the background until it finishes on its own;
/// every timed-out call leaves one such thread behind.
#[derive(Copy, Clone, Debug, Default)]
pub struct SatEngine;

struct Compiled {
    formula: CnfFormula,
    // literal of every value of every variable, in variable order
    values: Vec<Vec<(Value, Lit)>>,
    infeasible: bool,
}

impl Compiled {
    fn lit(&self, var: VarId, value: Value) -> Option<Lit> {
        self.values.get(var.index())?
            .iter()
            .find(|(candidate, _)| *candidate == value)
            .map(|(_, lit)| *lit)
    }

    fn clause(&mut self, lits: &[Lit]) {
        if lits.is_empty() {
            // nothing can satisfy the empty clause
            self.infeasible = true;
        } else {
            self.formula.add_clause(lits);
        }
    }

    fn clauses(&mut self, clauses: Vec<Vec<Lit>>) {
        clauses.iter().for_each(|clause| self.clause(clause));
    }

    fn linear(&mut self, sum: &LinearSum, enforced_by: Option<VarId>) {
        let guard = match enforced_by {
            // a trigger which cannot be 1 never enforces anything
            Some(trigger) => match self.lit(trigger, 1) {
                Some(lit) => Some(lit),
                None => return,
            },
            None => None,
        };

        let terms = sum.terms.iter()
            .map(|(coefficient, var)| self.values.get(var.index())
                .map(|values| values.iter().map(|(value, lit)| (coefficient * value, *lit)).collect_vec())
                .unwrap_or_default())
            .collect_vec();

        // bounds on what the terms after each position can still contribute
        let mut rest_bounds = vec![(0, 0); terms.len()];
        for index in (0..terms.len().saturating_sub(1)).rev() {
            let next = &terms[index + 1];
            let low = next.iter().map(|(value, _)| *value).min().unwrap_or(0);
            let high = next.iter().map(|(value, _)| *value).max().unwrap_or(0);
            rest_bounds[index] = (rest_bounds[index + 1].0 + low, rest_bounds[index + 1].1 + high);
        }

        let reachable = |partial: Value, (rest_low, rest_high): (Value, Value)| match sum.relation {
            Relation::Eq => partial + rest_low <= sum.rhs && sum.rhs <= partial + rest_high,
            Relation::Le => partial + rest_low <= sum.rhs,
            Relation::Ge => partial + rest_high >= sum.rhs,
        };

        if terms.is_empty() {
            if !sum.relation.holds(0, sum.rhs) {
                self.clause(&guard.map(|lit| vec![!lit]).unwrap_or_default());
            }
            return;
        }

        // the empty prefix sums to 0 unconditionally
        let mut previous: BTreeMap<Value, Option<Lit>> = BTreeMap::from([(0, None)]);

        for (index, term) in terms.iter().enumerate() {
            let last = index + 1 == terms.len();
            let mut next: BTreeMap<Value, Option<Lit>> = BTreeMap::new();

            for (partial, partial_lit) in &previous {
                for (contribution, value_lit) in term {
                    let mut premise = Vec::with_capacity(3);
                    premise.extend(partial_lit.map(|lit| !lit));
                    premise.push(!*value_lit);

                    let total = partial + contribution;
                    if reachable(total, rest_bounds[index]) {
                        if last {
                            // the relation holds outright
                            continue;
                        }
                        let sum_lit = *next.entry(total)
                            .or_insert_with(|| Some(self.formula.new_lit()));
                        premise.extend(sum_lit);
                        self.clause(&premise);
                    } else {
                        premise.extend(guard.map(|lit| !lit));
                        self.clause(&premise);
                    }
                }
            }

            previous = next;
        }
    }

    fn add(&mut self, constraint: &Constraint) {
        match constraint {
            Constraint::Fix { var, value } => match self.lit(*var, *value) {
                Some(lit) => self.clause(&[lit]),
                None => self.infeasible = true,
            },
            Constraint::AllDifferent(vars) => {
                let values = vars.iter()
                    .filter_map(|var| self.values.get(var.index()))
                    .flat_map(|values| values.iter().map(|(value, _)| *value))
                    .collect::<BTreeSet<_>>();

                for value in values {
                    let sharing = vars.iter()
                        .filter_map(|var| self.lit(*var, value))
                        .collect_vec();
                    let clauses = at_most_one(&sharing);
                    self.clauses(clauses);
                }
            }
            Constraint::Linear { sum, enforced_by } => self.linear(sum, *enforced_by),
            Constraint::AnyOf(vars) => {
                let lits = vars.iter()
                    .filter_map(|var| self.lit(*var, 1))
                    .collect_vec();
                self.clause(&lits);
            }
            Constraint::Forbid(pairs) => {
                let lits = pairs.iter()
                    .map(|(var, value)| self.lit(*var, *value).map(|lit| !lit))
                    .collect::<Option<Vec<_>>>();
                // if any variable cannot take its value at all, the combination is already impossible
                if let Some(lits) = lits {
                    self.clause(&lits);
                }
            }
        }
    }
}

impl From<&ConstraintModel> for Compiled {
    fn from(model: &ConstraintModel) -> Self {
        let mut compiled = Self {
            formula: CnfFormula::new(),
            values: Vec::with_capacity(model.variables().len()),
            infeasible: false,
        };

        for var in model.variables() {
            let lits = var.domain.clone()
                .map(|value| (value, compiled.formula.new_lit()))
                .collect_vec();
            // an empty domain leaves the empty clause behind
            compiled.clauses(exactly_one(lits.iter().map(|(_, lit)| *lit).collect_vec()));
            compiled.values.push(lits);
        }

        for named in model.constraints() {
            compiled.add(&named.constraint);
        }

        compiled
    }
}

fn run_search(formula: CnfFormula) -> Result<Option<Vec<Lit>>, EngineError> {
    let mut solver = Solver::new();
    solver.add_formula(&formula);

    match solver.solve() {
        Ok(true) => solver.model()
            .map(Some)
            .ok_or_else(|| EngineError::Backend("satisfiable formula without a model".to_string())),
        Ok(false) => Ok(None),
        Err(e) => Err(EngineError::Backend(format!("{:?}", e))),
    }
}

impl ConstraintEngine for SatEngine {
    fn solve(&self, model: &ConstraintModel, time_limit: Option<Duration>) -> Result<Option<Assignment>, EngineError> {
        let Compiled { formula, values, infeasible } = Compiled::from(model);
        debug!("compiled {} variables into {} SAT variables and {} clauses", values.len(), formula.var_count(), formula.len());
        if infeasible {
            debug!("model is trivially infeasible");
            return Ok(None);
        }

        let found = match time_limit {
            None => run_search(formula)?,
            Some(limit) => {
                let (sender, receiver) = mpsc::channel();
                thread::Builder::new()
                    .name("edgelink-search".to_string())
                    .spawn(move || {
                        // the receiver is gone if we already timed out; nobody is left to tell
                        let _ = sender.send(run_search(formula));
                    })
                    .map_err(|e| EngineError::Backend(e.to_string()))?;

                match receiver.recv_timeout(limit) {
                    Ok(result) => result?,
                    Err(RecvTimeoutError::Timeout) => return Err(EngineError::TimedOut(limit)),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(EngineError::Backend("search thread exited without a result".to_string()));
                    }
                }
            }
        };

        let Some(sat_model) = found else {
            return Ok(None);
        };

        values.iter()
            .enumerate()
            .map(|(index, lits)| lits.iter()
                .find(|(_, lit)| sat_model.get(lit.var().index()).is_some_and(|solved| solved == lit))
                .map(|(value, _)| *value)
                .ok_or_else(|| EngineError::Backend(format!("no value found for variable {}", index))))
            .collect::<Result<Vec<_>, _>>()
            .map(|values| Some(Assignment::new(values)))
    }
}
