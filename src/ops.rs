use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    expr::{BinopKind, Expr, NodeKind, Sort},
    search::ConfigError,
};

/// Argument and result sorts of an operator.
#[derive(Clone, Copy)]
pub enum Signature {
    Fixed {
        args: &'static [Sort],
        ret: Sort,
    },
    /// The signature depends on which sort the grammar assigns to the
    /// operator itself.
    ContextDependent(fn(Sort) -> (&'static [Sort], Sort)),
}

pub type Builder = fn(&[Rc<Expr>]) -> Option<Expr>;

#[derive(Clone, Copy)]
pub struct Operator {
    pub kind: NodeKind,
    pub signature: Signature,
    pub build: Builder,
}

/// All node constructors in search priority order.
pub const CATALOG: [Operator; 9] = [
    Operator {
        kind: NodeKind::Constant,
        signature: Signature::Fixed { args: &[], ret: Sort::Int },
        build: build_terminal,
    },
    Operator {
        kind: NodeKind::False,
        signature: Signature::Fixed { args: &[], ret: Sort::Bool },
        build: build_terminal,
    },
    Operator {
        kind: NodeKind::Variable,
        signature: Signature::ContextDependent(variable_signature),
        build: build_terminal,
    },
    Operator {
        kind: NodeKind::Plus,
        signature: Signature::Fixed { args: &[Sort::Int, Sort::Int], ret: Sort::Int },
        build: build_plus,
    },
    Operator {
        kind: NodeKind::Times,
        signature: Signature::Fixed { args: &[Sort::Int, Sort::Int], ret: Sort::Int },
        build: build_times,
    },
    Operator {
        kind: NodeKind::LessThan,
        signature: Signature::Fixed { args: &[Sort::Int, Sort::Int], ret: Sort::Bool },
        build: build_lt,
    },
    Operator {
        kind: NodeKind::And,
        signature: Signature::Fixed { args: &[Sort::Bool, Sort::Bool], ret: Sort::Bool },
        build: build_and,
    },
    Operator {
        kind: NodeKind::Not,
        signature: Signature::Fixed { args: &[Sort::Bool], ret: Sort::Bool },
        build: build_not,
    },
    Operator {
        kind: NodeKind::IfThenElse,
        signature: Signature::ContextDependent(ite_signature),
        build: build_ite,
    },
];

fn variable_signature(sort: Sort) -> (&'static [Sort], Sort) {
    (&[], sort)
}

fn ite_signature(sort: Sort) -> (&'static [Sort], Sort) {
    match sort {
        Sort::Int => (&[Sort::Bool, Sort::Int, Sort::Int], Sort::Int),
        Sort::Bool => (&[Sort::Bool, Sort::Bool, Sort::Bool], Sort::Bool),
    }
}

// Terminals are seeded directly, never built out of arguments.
fn build_terminal(_args: &[Rc<Expr>]) -> Option<Expr> {
    None
}

fn build_binop(kind: BinopKind, args: &[Rc<Expr>]) -> Option<Expr> {
    match args {
        [l, r] => Some(Expr::Binop(kind, l.clone(), r.clone())),
        _ => None,
    }
}

fn build_plus(args: &[Rc<Expr>]) -> Option<Expr> {
    build_binop(BinopKind::Plus, args)
}

fn build_times(args: &[Rc<Expr>]) -> Option<Expr> {
    build_binop(BinopKind::Times, args)
}

fn build_lt(args: &[Rc<Expr>]) -> Option<Expr> {
    build_binop(BinopKind::LessThan, args)
}

fn build_and(args: &[Rc<Expr>]) -> Option<Expr> {
    build_binop(BinopKind::And, args)
}

fn build_not(args: &[Rc<Expr>]) -> Option<Expr> {
    match args {
        [e] => Some(Expr::Not(e.clone())),
        _ => None,
    }
}

fn build_ite(args: &[Rc<Expr>]) -> Option<Expr> {
    match args {
        [c, t, f] => Some(Expr::Ite(c.clone(), t.clone(), f.clone())),
        _ => None,
    }
}

/// Which operators produce integers and which produce booleans for
/// one search. The polymorphic operators (`Variable`, `IfThenElse`)
/// take their sort from the list they appear in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    pub int_ops: Vec<NodeKind>,
    pub bool_ops: Vec<NodeKind>,
}

impl Grammar {
    pub fn standard() -> Self {
        Self {
            int_ops: vec![
                NodeKind::Variable,
                NodeKind::Constant,
                NodeKind::Plus,
                NodeKind::Times,
                NodeKind::IfThenElse,
            ],
            bool_ops: vec![
                NodeKind::And,
                NodeKind::Not,
                NodeKind::LessThan,
                NodeKind::False,
            ],
        }
    }

    fn placement(&self, kind: NodeKind) -> Result<Option<Sort>, ConfigError> {
        match (self.int_ops.contains(&kind), self.bool_ops.contains(&kind)) {
            (true, true) => Err(ConfigError::AmbiguousSort(kind)),
            (true, false) => Ok(Some(Sort::Int)),
            (false, true) => Ok(Some(Sort::Bool)),
            (false, false) => Ok(None),
        }
    }

    fn is_enabled(&self, kind: NodeKind) -> bool {
        self.int_ops.contains(&kind) || self.bool_ops.contains(&kind)
    }

    /// Resolves every context dependent signature once. Operators that
    /// appear in neither list are left out of the resolved catalog.
    pub fn resolve(&self) -> Result<ResolvedGrammar, ConfigError> {
        let variable = self.placement(NodeKind::Variable)?;
        let mut ops = Vec::new();

        for op in CATALOG.iter().filter(|op| self.is_enabled(op.kind)) {
            let (args, ret) = match op.signature {
                Signature::Fixed { args, ret } => (args, ret),
                Signature::ContextDependent(resolver) => {
                    // Enabled means placed, and `placement` already
                    // rejected the ambiguous case.
                    let Some(sort) = self.placement(op.kind)? else { continue };

                    resolver(sort)
                },
            };

            ops.push(ResolvedOp {
                kind: op.kind,
                args,
                ret,
                build: op.build,
            });
        }

        Ok(ResolvedGrammar { variable, ops })
    }
}

#[derive(Clone, Copy)]
pub struct ResolvedOp {
    pub kind: NodeKind,
    pub args: &'static [Sort],
    pub ret: Sort,
    pub build: Builder,
}

impl fmt::Debug for ResolvedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOp")
            .field("kind", &self.kind)
            .field("args", &self.args)
            .field("ret", &self.ret)
            .finish()
    }
}

impl ResolvedOp {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A grammar with every operator sort fixed for the current search.
#[derive(Debug, Clone)]
pub struct ResolvedGrammar {
    pub variable: Option<Sort>,
    pub ops: Vec<ResolvedOp>,
}

impl ResolvedGrammar {
    pub fn op(&self, kind: NodeKind) -> Option<&ResolvedOp> {
        self.ops.iter().find(|op| op.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_grammar_resolves() {
        let resolved = Grammar::standard().resolve().unwrap();

        assert_eq!(resolved.variable, Some(Sort::Int));

        let ite = resolved.op(NodeKind::IfThenElse).unwrap();
        assert_eq!(ite.args, &[Sort::Bool, Sort::Int, Sort::Int]);
        assert_eq!(ite.ret, Sort::Int);

        // Priority order is kept regardless of the order in the lists
        let kinds = resolved.ops.iter().map(|op| op.kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec![
            NodeKind::Constant,
            NodeKind::False,
            NodeKind::Variable,
            NodeKind::Plus,
            NodeKind::Times,
            NodeKind::LessThan,
            NodeKind::And,
            NodeKind::Not,
            NodeKind::IfThenElse,
        ]);
    }

    #[test]
    fn boolean_ite() {
        let grammar = Grammar {
            int_ops: vec![NodeKind::Variable, NodeKind::Constant],
            bool_ops: vec![NodeKind::IfThenElse, NodeKind::LessThan, NodeKind::False],
        };
        let resolved = grammar.resolve().unwrap();
        let ite = resolved.op(NodeKind::IfThenElse).unwrap();

        assert_eq!(ite.args, &[Sort::Bool, Sort::Bool, Sort::Bool]);
        assert_eq!(ite.ret, Sort::Bool);
        assert!(resolved.op(NodeKind::Plus).is_none());
    }

    #[test]
    fn ambiguous_placement_is_rejected() {
        let grammar = Grammar {
            int_ops: vec![NodeKind::Variable, NodeKind::IfThenElse],
            bool_ops: vec![NodeKind::IfThenElse],
        };

        assert_eq!(
            grammar.resolve().unwrap_err(),
            ConfigError::AmbiguousSort(NodeKind::IfThenElse),
        );
    }

    #[test]
    fn builders_check_arity() {
        let x: Rc<Expr> = Rc::new(Expr::Variable("x".into(), Sort::Int));

        assert!(build_plus(&[x.clone()]).is_none());
        assert_eq!(
            build_plus(&[x.clone(), x.clone()]),
            Some(Expr::Binop(BinopKind::Plus, x.clone(), x)),
        );
    }
}
