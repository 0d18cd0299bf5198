use std::{collections::BTreeMap, rc::Rc};

use crate::{
    expr::{Expr, NodeKind},
    ops::ResolvedOp,
};

use super::{
    bank::Bank,
    bottom_up::{pool_of_sort, TypeDirected},
    ArgumentPolicy,
};

/// Narrows the argument pools of selected operators to candidates
/// whose node is one of the allowed kinds. Operators without a
/// restriction are filled the same way as [`TypeDirected`] does.
///
/// This prunes a lot of nested arithmetic, at the price of making
/// some correct expressions unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restricted {
    restrictions: BTreeMap<NodeKind, Vec<Vec<NodeKind>>>,
}

impl Restricted {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Times` and `LessThan` may only combine bare variables and constants.
    pub fn standard() -> Self {
        let leaves = vec![NodeKind::Variable, NodeKind::Constant];

        Self::new()
            .restrict(NodeKind::Times, vec![leaves.clone(), leaves.clone()])
            .restrict(NodeKind::LessThan, vec![leaves.clone(), leaves])
    }

    /// Allows only the listed node kinds at each argument position of `op`.
    pub fn restrict(mut self, op: NodeKind, positions: Vec<Vec<NodeKind>>) -> Self {
        self.restrictions.insert(op, positions);
        self
    }

    pub fn restriction(&self, op: NodeKind) -> Option<&[Vec<NodeKind>]> {
        self.restrictions.get(&op).map(Vec::as_slice)
    }
}

impl ArgumentPolicy for Restricted {
    fn argument_pools<T>(&self, op: &ResolvedOp, bank: &Bank<T>) -> Vec<Vec<Rc<Expr>>> {
        let Some(positions) = self.restriction(op.kind) else {
            return TypeDirected.argument_pools(op, bank);
        };

        // The sort still has to match, otherwise a boolean-sorted
        // variable could end up under an arithmetic operator.
        positions.iter()
            .zip(op.args)
            .map(|(allowed, sort)| {
                pool_of_sort(bank, *sort).into_iter()
                    .filter(|expr| allowed.contains(&expr.kind()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::{BinopKind, Sort},
        ops::Grammar,
        synth::{bank::Candidate, Example},
    };

    #[test]
    fn restricted_pools_only_hold_leaves() {
        let examples = vec![Example::new([("x", 2)], 100)];
        let x = Rc::new(Expr::Variable("x".into(), Sort::Int));
        let three = Rc::new(Expr::Constant(3));
        let sum = Rc::new(Expr::Binop(BinopKind::Plus, x.clone(), three.clone()));

        let mut bank = Bank::new();
        for expr in [x.clone(), three.clone(), sum.clone()] {
            bank.insert(Candidate::new(expr, Sort::Int, &examples).unwrap());
        }

        let grammar = Grammar::standard().resolve().unwrap();
        let policy = Restricted::standard();

        let times = grammar.op(NodeKind::Times).unwrap();
        let pools = policy.argument_pools(times, &bank);
        assert_eq!(pools, vec![vec![x.clone(), three.clone()], vec![x.clone(), three.clone()]]);

        let plus = grammar.op(NodeKind::Plus).unwrap();
        let pools = policy.argument_pools(plus, &bank);
        assert_eq!(pools[0], vec![x, three, sum]);
    }
}
