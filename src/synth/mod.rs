pub mod bank;
pub mod bottom_up;
pub mod restricted;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{
    expr::{Env, Expr, ExprVal, Value},
    ops::ResolvedOp,
};

use self::bank::Bank;

/// A single input/output pair the synthesized expression has to reproduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub inputs: Env,
    pub output: Value,
}

impl Example {
    pub fn new<'a>(
        inputs: impl IntoIterator<Item = (&'a str, ExprVal)>,
        output: impl Into<Value>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter()
                .map(|(name, val)| (name.to_string(), val))
                .collect(),
            output: output.into(),
        }
    }
}

/// Decides which retained candidates may fill each argument position
/// of an operator. This is the only thing that differs between the
/// complete search and its faster, restricted variant.
pub trait ArgumentPolicy {
    /// Returns one pool of argument expressions per argument position.
    /// An empty pool simply means the operator produces nothing this time.
    fn argument_pools<T>(&self, op: &ResolvedOp, bank: &Bank<T>) -> Vec<Vec<Rc<Expr>>>;
}
