use std::{collections::BTreeMap, fmt, rc::Rc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ExprVal = i64;

/// Variable bindings of a single example.
pub type Env = BTreeMap<String, ExprVal>;

/// One of the two expression families of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Int,
    Bool,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Int => write!(f, "int"),
            Sort::Bool => write!(f, "bool"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(ExprVal),
    Bool(bool),
}

impl From<ExprVal> for Value {
    fn from(x: ExprVal) -> Self {
        Value::Int(x)
    }
}

// Lets unsuffixed integer literals stand for values.
impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Int(x.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Node tag of an expression, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Constant,
    False,
    Variable,
    Plus,
    Times,
    LessThan,
    And,
    Not,
    IfThenElse,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Constant => "NUM",
            NodeKind::False => "FALSE",
            NodeKind::Variable => "VR",
            NodeKind::Plus => "PLUS",
            NodeKind::Times => "TIMES",
            NodeKind::LessThan => "LT",
            NodeKind::And => "AND",
            NodeKind::Not => "NOT",
            NodeKind::IfThenElse => "ITE",
        };

        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinopKind {
    Plus,
    Times,
    LessThan,
    And,
}

/// An immutable expression tree. Subtrees are shared between the
/// candidates that were built out of them, so they are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Constant(ExprVal),
    /// A variable read as a value of the sort the grammar gave it. A
    /// boolean variable is true when its binding is non-zero.
    Variable(Rc<str>, Sort),
    False,
    Binop(BinopKind, Rc<Expr>, Rc<Expr>),
    Not(Rc<Expr>),
    Ite(Rc<Expr>, Rc<Expr>, Rc<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("variable `{0}` is not bound by the example")]
    UnboundVariable(String),
    #[error("{node} expected a {expected} operand, got {found}")]
    TypeMismatch {
        node: NodeKind,
        expected: Sort,
        found: Value,
    },
}

impl Expr {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Constant(_) => NodeKind::Constant,
            Expr::Variable(..) => NodeKind::Variable,
            Expr::False => NodeKind::False,
            Expr::Binop(kind, _, _) => match kind {
                BinopKind::Plus => NodeKind::Plus,
                BinopKind::Times => NodeKind::Times,
                BinopKind::LessThan => NodeKind::LessThan,
                BinopKind::And => NodeKind::And,
            },
            Expr::Not(_) => NodeKind::Not,
            Expr::Ite(..) => NodeKind::IfThenElse,
        }
    }

    /// Height of the tree, leaves count as 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Constant(_) | Expr::Variable(..) | Expr::False => 1,
            Expr::Binop(_, l, r) => 1 + l.depth().max(r.depth()),
            Expr::Not(e) => 1 + e.depth(),
            Expr::Ite(c, t, f) => 1 + c.depth().max(t.depth()).max(f.depth()),
        }
    }

    /// Evaluates the expression under `env`. Only the taken branch of
    /// an if-then-else is evaluated.
    pub fn eval(&self, env: &Env) -> Result<Value, EvalError> {
        match self {
            Expr::Constant(x) => Ok(Value::Int(*x)),
            Expr::False => Ok(Value::Bool(false)),
            Expr::Variable(name, sort) => {
                let x = env.get(&**name)
                    .copied()
                    .ok_or_else(|| EvalError::UnboundVariable(name.to_string()))?;

                match sort {
                    Sort::Int => Ok(Value::Int(x)),
                    Sort::Bool => Ok(Value::Bool(x != 0)),
                }
            },
            Expr::Binop(kind, l, r) => {
                let node = self.kind();
                let (l, r) = (l.eval(env)?, r.eval(env)?);

                match kind {
                    BinopKind::Plus => Ok(Value::Int(
                        expect_int(node, l)?.wrapping_add(expect_int(node, r)?)
                    )),
                    BinopKind::Times => Ok(Value::Int(
                        expect_int(node, l)?.wrapping_mul(expect_int(node, r)?)
                    )),
                    BinopKind::LessThan => Ok(Value::Bool(
                        expect_int(node, l)? < expect_int(node, r)?
                    )),
                    BinopKind::And => Ok(Value::Bool(
                        expect_bool(node, l)? && expect_bool(node, r)?
                    )),
                }
            },
            Expr::Not(e) => {
                let e = e.eval(env)?;

                Ok(Value::Bool(!expect_bool(NodeKind::Not, e)?))
            },
            Expr::Ite(c, t, f) => {
                let c = c.eval(env)?;

                if expect_bool(NodeKind::IfThenElse, c)? {
                    t.eval(env)
                } else {
                    f.eval(env)
                }
            },
        }
    }
}

fn expect_int(node: NodeKind, val: Value) -> Result<ExprVal, EvalError> {
    match val {
        Value::Int(x) => Ok(x),
        found => Err(EvalError::TypeMismatch { node, expected: Sort::Int, found }),
    }
}

fn expect_bool(node: NodeKind, val: Value) -> Result<bool, EvalError> {
    match val {
        Value::Bool(b) => Ok(b),
        found => Err(EvalError::TypeMismatch { node, expected: Sort::Bool, found }),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(x) => write!(f, "{x}"),
            Expr::Variable(name, _) => f.write_str(name),
            Expr::False => f.write_str("false"),
            Expr::Binop(kind, l, r) => {
                let op = match kind {
                    BinopKind::Plus => "+",
                    BinopKind::Times => "*",
                    BinopKind::LessThan => "<",
                    BinopKind::And => "&&",
                };

                write!(f, "({l}{op}{r})")
            },
            Expr::Not(e) => write!(f, "(!{e})"),
            Expr::Ite(c, t, e) => write!(f, "(if {c} then {t} else {e})"),
        }
    }
}
