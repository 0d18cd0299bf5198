use std::{collections::HashMap, rc::Rc};

use log::trace;

use crate::expr::{EvalError, Expr, Sort, Value};

use super::Example;

/// An expression together with what it computes on every example.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub expr: Rc<Expr>,
    pub sort: Sort,
    pub outputs: Rc<[Value]>,
    pub success: bool,
}

impl Candidate {
    pub fn new(expr: Rc<Expr>, sort: Sort, examples: &[Example]) -> Result<Self, EvalError> {
        let outputs = examples.iter()
            .map(|ex| expr.eval(&ex.inputs))
            .collect::<Result<Rc<[Value]>, _>>()?;
        let success = outputs.iter()
            .zip(examples)
            .all(|(out, ex)| *out == ex.output);

        Ok(Self {
            expr,
            sort,
            outputs,
            success,
        })
    }

    /// Two candidates are equivalent when they agree on every example.
    pub fn equivalent_to(&self, other: &Candidate) -> bool {
        self.outputs == other.outputs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    New,
    Existing,
}

/// Picks which of two equivalent candidates stays in the bank.
/// Only ever consulted for candidates that are already known to be
/// equivalent.
pub trait TieBreak {
    fn resolve(&self, new: &Candidate, existing: &Candidate) -> Keep;
}

/// Candidates arrive in order of non-decreasing depth, so the one
/// found first is never the worse one.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExisting;

impl TieBreak for KeepExisting {
    fn resolve(&self, _new: &Candidate, _existing: &Candidate) -> Keep {
        Keep::Existing
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeepNew;

impl TieBreak for KeepNew {
    fn resolve(&self, _new: &Candidate, _existing: &Candidate) -> Keep {
        Keep::New
    }
}

/// What happened to a candidate handed to [`Bank::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Winner,
    Retained,
    Replaced,
    Discarded,
    /// A winner was already set, the bank no longer changes.
    Frozen,
}

/// Observational equivalence bank. Keeps at most one candidate per
/// distinct output vector, and the first candidate that matches every
/// example.
#[derive(Debug)]
pub struct Bank<T = KeepExisting> {
    retained: Vec<Candidate>,
    by_outputs: HashMap<Rc<[Value]>, usize>,
    winner: Option<Candidate>,
    tie_break: T,
}

impl Bank<KeepExisting> {
    pub fn new() -> Self {
        Self::with_tie_break(KeepExisting)
    }
}

impl Default for Bank<KeepExisting> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Bank<T> {
    pub fn retained(&self) -> &[Candidate] {
        &self.retained
    }

    pub fn winner(&self) -> Option<&Candidate> {
        self.winner.as_ref()
    }

    pub fn has_winner(&self) -> bool {
        self.winner.is_some()
    }

    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    pub fn into_winner(self) -> Option<Candidate> {
        self.winner
    }
}

impl<T: TieBreak> Bank<T> {
    pub fn with_tie_break(tie_break: T) -> Self {
        Self {
            retained: Vec::new(),
            by_outputs: HashMap::new(),
            winner: None,
            tie_break,
        }
    }

    pub fn insert(&mut self, cand: Candidate) -> Insertion {
        if self.winner.is_some() {
            return Insertion::Frozen;
        }

        if cand.success {
            trace!("Winner: {}", cand.expr);
            self.winner = Some(cand);
            return Insertion::Winner;
        }

        let Some(&idx) = self.by_outputs.get(&cand.outputs) else {
            trace!("Retain: {}", cand.expr);
            self.by_outputs.insert(cand.outputs.clone(), self.retained.len());
            self.retained.push(cand);
            return Insertion::Retained;
        };

        match self.tie_break.resolve(&cand, &self.retained[idx]) {
            Keep::Existing => {
                trace!("Discard: {} (same as {})", cand.expr, self.retained[idx].expr);
                Insertion::Discarded
            },
            Keep::New => {
                trace!("Replace: {} with {}", self.retained[idx].expr, cand.expr);
                self.retained.remove(idx);
                for (pos, kept) in self.retained.iter().enumerate().skip(idx) {
                    self.by_outputs.insert(kept.outputs.clone(), pos);
                }
                self.by_outputs.insert(cand.outputs.clone(), self.retained.len());
                self.retained.push(cand);
                Insertion::Replaced
            },
        }
    }

    /// Inserts candidates in order, stopping as soon as a winner shows up.
    /// Candidates are pulled lazily, so nothing past the winner is built.
    /// `observe` is told what happened to every candidate inserted.
    pub fn insert_all<E>(
        &mut self,
        cands: impl IntoIterator<Item = Result<Candidate, E>>,
        mut observe: impl FnMut(Insertion),
    ) -> Result<(), E> {
        for cand in cands {
            if self.winner.is_some() {
                break;
            }

            observe(self.insert(cand?));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinopKind;

    fn examples() -> Vec<Example> {
        vec![
            Example::new([("x", 1)], 7),
            Example::new([("x", 2)], 9),
        ]
    }

    fn var(name: &str) -> Rc<Expr> {
        Rc::new(Expr::Variable(name.into(), Sort::Int))
    }

    fn num(x: i64) -> Rc<Expr> {
        Rc::new(Expr::Constant(x))
    }

    fn cand(expr: Rc<Expr>) -> Candidate {
        Candidate::new(expr, Sort::Int, &examples()).unwrap()
    }

    #[test]
    fn candidate_outputs() {
        let c = cand(Rc::new(Expr::Binop(BinopKind::Plus, var("x"), num(3))));

        assert_eq!(&*c.outputs, &[Value::Int(4), Value::Int(5)]);
        assert!(!c.success);
    }

    #[test]
    fn keeps_one_per_behaviour() {
        let mut bank = Bank::new();
        let x = var("x");

        assert_eq!(bank.insert(cand(x.clone())), Insertion::Retained);
        assert_eq!(bank.insert(cand(num(2))), Insertion::Retained);
        // x * 1 and 1 * x both behave like x
        assert_eq!(
            bank.insert(cand(Rc::new(Expr::Binop(BinopKind::Times, x.clone(), num(1))))),
            Insertion::Discarded,
        );
        assert_eq!(
            bank.insert(cand(Rc::new(Expr::Binop(BinopKind::Times, num(1), x.clone())))),
            Insertion::Discarded,
        );

        assert_eq!(bank.len(), 2);
        assert_eq!(*bank.retained()[0].expr, Expr::Variable("x".into(), Sort::Int));

        let all = bank.retained();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.equivalent_to(b));
            }
        }
    }

    #[test]
    fn keep_new_moves_to_the_back() {
        let mut bank = Bank::with_tie_break(KeepNew);
        let x = var("x");

        bank.insert(cand(x.clone()));
        bank.insert(cand(num(2)));
        let x_plus_0 = Rc::new(Expr::Binop(BinopKind::Plus, x.clone(), num(0)));
        assert_eq!(bank.insert(cand(x_plus_0.clone())), Insertion::Replaced);

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.retained()[0].expr, num(2));
        assert_eq!(bank.retained()[1].expr, x_plus_0);

        // The index must follow the shifted positions
        assert_eq!(bank.insert(cand(num(2))), Insertion::Replaced);
        assert_eq!(bank.retained()[0].expr, x_plus_0);
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn first_winner_freezes_the_bank() {
        let mut bank = Bank::new();
        let x = var("x");
        // 2x + 5
        let win = Rc::new(Expr::Binop(
            BinopKind::Plus,
            Rc::new(Expr::Binop(BinopKind::Plus, x.clone(), x.clone())),
            num(5),
        ));
        let other_win = Rc::new(Expr::Binop(
            BinopKind::Plus,
            num(5),
            Rc::new(Expr::Binop(BinopKind::Plus, x.clone(), x.clone())),
        ));

        let mut seen = Vec::new();
        bank.insert_all(
            [cand(x.clone()), cand(win.clone()), cand(other_win), cand(num(3))]
                .into_iter()
                .map(Ok::<_, EvalError>),
            |insertion| seen.push(insertion),
        )
        .unwrap();

        assert_eq!(seen, vec![Insertion::Retained, Insertion::Winner]);

        assert_eq!(bank.winner().map(|w| w.expr.clone()), Some(win));
        assert!(bank.winner().unwrap().success);
        // Nothing after the winner was looked at
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.insert(cand(num(3))), Insertion::Frozen);
    }
}
