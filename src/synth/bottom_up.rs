use std::rc::Rc;

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    expr::{EvalError, Expr, ExprVal, Sort},
    ops::{ResolvedGrammar, ResolvedOp},
};

use super::{
    bank::{Bank, Candidate, Insertion, KeepExisting, TieBreak},
    ArgumentPolicy,
    Example,
};

/// Fills every argument position with the retained candidates whose
/// sort matches the one the operator expects there.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDirected;

impl ArgumentPolicy for TypeDirected {
    fn argument_pools<T>(&self, op: &ResolvedOp, bank: &Bank<T>) -> Vec<Vec<Rc<Expr>>> {
        op.args.iter()
            .map(|sort| pool_of_sort(bank, *sort))
            .collect()
    }
}

pub(crate) fn pool_of_sort<T>(bank: &Bank<T>, sort: Sort) -> Vec<Rc<Expr>> {
    bank.retained().iter()
        .filter(|cand| cand.sort == sort)
        .map(|cand| cand.expr.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Searching,
    Succeeded,
    Exhausted,
}

fn record(stats: &mut SearchStats, insertion: Insertion) {
    stats.generated += 1;
    match insertion {
        Insertion::Discarded => stats.discarded += 1,
        Insertion::Replaced => stats.replaced += 1,
        Insertion::Winner | Insertion::Retained | Insertion::Frozen => (),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Depth reached, terminals being depth 1.
    pub depth: usize,
    pub layers: usize,
    /// Candidates built and evaluated, terminals included.
    pub generated: usize,
    pub retained: usize,
    pub discarded: usize,
    pub replaced: usize,
}

/// Terminal expressions every search starts from.
pub struct Terminals<'a> {
    pub constants: &'a [ExprVal],
    pub variables: &'a [String],
    /// Sort of variable nodes. Only consulted when there are variables.
    pub variable_sort: Sort,
}

/// Layered bottom-up enumerator. Every layer combines the candidates
/// retained so far through each operator of the grammar, in catalog
/// order, until some candidate matches all the examples.
pub struct BottomUp<'a, P, T = KeepExisting> {
    grammar: ResolvedGrammar,
    examples: &'a [Example],
    policy: P,
    bank: Bank<T>,
    max_depth: usize,
    stats: SearchStats,
}

impl<'a, P, T> BottomUp<'a, P, T>
where
    P: ArgumentPolicy,
    T: TieBreak,
{
    pub fn new(
        grammar: ResolvedGrammar,
        terminals: Terminals<'_>,
        examples: &'a [Example],
        max_depth: usize,
        policy: P,
        tie_break: T,
    ) -> Result<Self, EvalError> {
        let mut res = Self {
            grammar,
            examples,
            policy,
            bank: Bank::with_tie_break(tie_break),
            max_depth,
            stats: SearchStats {
                depth: 1,
                ..SearchStats::default()
            },
        };

        res.seed(terminals)?;

        Ok(res)
    }

    fn seed(&mut self, terminals: Terminals<'_>) -> Result<(), EvalError> {
        let constants = terminals.constants.iter()
            .map(|c| (Expr::Constant(*c), Sort::Int));
        let sort = terminals.variable_sort;
        let variables = terminals.variables.iter()
            .map(|v| (Expr::Variable(v.as_str().into(), sort), sort));
        let falsity = std::iter::once((Expr::False, Sort::Bool));

        let examples = self.examples;
        let cands = constants.chain(variables)
            .chain(falsity)
            .map(|(expr, sort)| Candidate::new(Rc::new(expr), sort, examples));

        let stats = &mut self.stats;
        self.bank.insert_all(cands, |insertion| record(stats, insertion))?;

        debug!("Seeded {} terminals, {} retained", self.stats.generated, self.bank.len());

        Ok(())
    }

    pub fn state(&self) -> State {
        if self.bank.has_winner() {
            State::Succeeded
        } else if self.stats.depth >= self.max_depth {
            State::Exhausted
        } else {
            State::Searching
        }
    }

    /// Builds the next layer, unless the search is already over.
    pub fn step(&mut self) -> Result<State, EvalError> {
        if self.state() != State::Searching {
            return Ok(self.state());
        }

        self.add_layer()?;
        self.stats.depth += 1;
        self.stats.layers += 1;

        debug!(
            "Depth {}: {} retained, {} generated so far",
            self.stats.depth,
            self.bank.len(),
            self.stats.generated,
        );

        Ok(self.state())
    }

    fn add_layer(&mut self) -> Result<(), EvalError> {
        for op in &self.grammar.ops {
            if self.bank.has_winner() {
                break;
            }

            // Nullary operators are the terminals, seeded once
            if op.arity() == 0 {
                continue;
            }

            // Pools are taken from the bank as it is now, so they include
            // what earlier operators of this very layer added.
            let pools = self.policy.argument_pools(op, &self.bank);
            trace!(
                "{}: pool sizes {:?}",
                op.kind,
                pools.iter().map(Vec::len).collect::<Vec<_>>(),
            );

            let examples = self.examples;
            let cands = pools.into_iter()
                .multi_cartesian_product()
                .filter_map(|args| (op.build)(&args))
                .map(|expr| Candidate::new(Rc::new(expr), op.ret, examples));

            let stats = &mut self.stats;
            self.bank.insert_all(cands, |insertion| record(stats, insertion))?;
        }

        Ok(())
    }

    pub fn run(mut self) -> Result<(Option<Candidate>, SearchStats), EvalError> {
        while self.step()? == State::Searching {}

        let stats = self.stats();
        Ok((self.bank.into_winner(), stats))
    }

    pub fn bank(&self) -> &Bank<T> {
        &self.bank
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            retained: self.bank.len(),
            ..self.stats
        }
    }
}
