use std::ops::Index;

use itertools::Itertools;
use varisat::Lit;

pub(crate) fn at_most_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    // no two are true; (!A + !B) * (!A + !C) * ...
    lits.iter()
        .combinations(2)
        .map(|pair| vec![!**pair.index(0), !**pair.index(1)])
        .collect_vec()
}

pub(crate) fn exactly_one(lits: Vec<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    clauses.extend(at_most_one(&lits));
    // at least one is true; A + B + C + ...
    clauses.push(lits);

    clauses
}

#[cfg(test)]
mod tests {
    use varisat::Var;

    use super::*;

    #[test]
    fn clause_counts() {
        let lits = (0..4).map(|index| Var::from_index(index).positive()).collect_vec();
        assert_eq!(at_most_one(&lits).len(), 6);

        let clauses = exactly_one(lits.clone());
        assert_eq!(clauses.len(), 7);
        assert_eq!(clauses.last().unwrap(), &lits);
        assert!(clauses[0].iter().all(|lit| lit.is_negative()));
    }
}
