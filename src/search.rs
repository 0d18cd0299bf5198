use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::{
    expr::{EvalError, Expr, NodeKind, Sort},
    problem::Problem,
    synth::{
        bank::{KeepExisting, TieBreak},
        bottom_up::{BottomUp, SearchStats, Terminals, TypeDirected},
        restricted::Restricted,
        ArgumentPolicy,
    },
};

/// The caller handed in a problem that breaks a precondition of the
/// search. Detected before anything is enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max depth must be at least 1")]
    ZeroDepth,
    #[error("no examples given")]
    EmptyExamples,
    #[error("{0} is listed as both an integer and a boolean operator")]
    AmbiguousSort(NodeKind),
    #[error("variables are declared but {} is in neither operator list", NodeKind::Variable)]
    UnplacedVariable,
    #[error("example {example} does not bind variable `{name}`")]
    UnboundVariable {
        example: usize,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("invalid problem: {0}")]
    Config(#[from] ConfigError),
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Rc<Expr>),
    /// Nothing matches all the examples within the depth bound.
    NoSolution,
}

impl Outcome {
    pub fn expr(&self) -> Option<&Rc<Expr>> {
        match self {
            Outcome::Found(e) => Some(e),
            Outcome::NoSolution => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub outcome: Outcome,
    pub stats: SearchStats,
}

impl Problem {
    /// Checks the preconditions of the search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }

        if self.examples.is_empty() {
            return Err(ConfigError::EmptyExamples);
        }

        for (example, ex) in self.examples.iter().enumerate() {
            if let Some(name) = self.variables.iter().find(|v| !ex.inputs.contains_key(*v)) {
                return Err(ConfigError::UnboundVariable {
                    example,
                    name: name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Searches for the shallowest expression that reproduces every example.
pub fn synthesize(problem: &Problem) -> Result<Synthesis, SynthError> {
    synthesize_with(problem, TypeDirected, KeepExisting)
}

/// Same search, with `Times` and `LessThan` only combining variables
/// and constants. Faster, but may miss solutions.
pub fn synthesize_restricted(problem: &Problem) -> Result<Synthesis, SynthError> {
    synthesize_with(problem, Restricted::standard(), KeepExisting)
}

pub fn synthesize_with<P, T>(
    problem: &Problem,
    policy: P,
    tie_break: T,
) -> Result<Synthesis, SynthError>
where
    P: ArgumentPolicy,
    T: TieBreak,
{
    problem.validate()?;

    let grammar = problem.grammar.resolve()?;
    let variable_sort = match grammar.variable {
        Some(sort) => sort,
        None if problem.variables.is_empty() => Sort::Int,
        None => return Err(ConfigError::UnplacedVariable.into()),
    };
    debug!("Resolved grammar: {:?}", grammar.ops);

    let terminals = Terminals {
        constants: &problem.constants,
        variables: &problem.variables,
        variable_sort,
    };
    let enumerator = BottomUp::new(
        grammar,
        terminals,
        &problem.examples,
        problem.max_depth,
        policy,
        tie_break,
    )?;
    let (winner, stats) = enumerator.run()?;

    let outcome = match winner {
        Some(cand) => {
            info!("Found {} at depth {}", cand.expr, stats.depth);
            Outcome::Found(cand.expr)
        },
        None => {
            info!("No solution within depth {}", problem.max_depth);
            Outcome::NoSolution
        },
    };
    debug!("{stats:?}");

    Ok(Synthesis { outcome, stats })
}
