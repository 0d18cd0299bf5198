use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    expr::ExprVal,
    ops::Grammar,
    synth::Example,
};

/// Everything a single synthesis call needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub max_depth: usize,
    #[serde(flatten)]
    pub grammar: Grammar,
    pub variables: Vec<String>,
    #[serde(default)]
    pub constants: Vec<ExprVal>,
    pub examples: Vec<Example>,
}

impl Problem {
    /// A problem over the standard grammar.
    pub fn standard(
        max_depth: usize,
        variables: &[&str],
        constants: &[ExprVal],
        examples: Vec<Example>,
    ) -> Self {
        Self {
            max_depth,
            grammar: Grammar::standard(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            constants: constants.to_vec(),
            examples,
        }
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Human readable summary of the examples and constants.
impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solving for: ")?;
        for ex in &self.examples {
            write!(f, " ")?;
            for (name, val) in &ex.inputs {
                write!(f, " * {name}: {val}")?;
            }
            writeln!(f, " * _out: {}", ex.output)?;
        }

        let constants = self.constants.iter()
            .map(ExprVal::to_string)
            .collect::<Vec<_>>();
        write!(f, "with constants: {}", constants.join(", "))
    }
}

pub const DEMO_DEPTH: usize = 4;

pub const DEMO_SUITES: [&str; 3] = ["1a1", "1a2", "1b"];

/// Built-in problem sets. The `1b` set is meant to be solved with the
/// restricted search.
pub fn demo_suite(name: &str) -> Option<Vec<Problem>> {
    let min_like = || vec![
        Example::new([("x", 5), ("y", 10)], 5),
        Example::new([("x", 8), ("y", 3)], 3),
    ];
    let piecewise = || vec![
        Example::new([("x", 10), ("y", 7)], 17),
        Example::new([("x", 4), ("y", 7)], -7),
        Example::new([("x", 10), ("y", 3)], 13),
        Example::new([("x", 1), ("y", -7)], -6),
        Example::new([("x", 1), ("y", 8)], -8),
    ];

    let suite = match name {
        "1a1" => vec![
            Problem::standard(DEMO_DEPTH, &["x", "y"], &[4, 5], min_like()),
            Problem::standard(DEMO_DEPTH, &["x", "y"], &[], min_like()),
            Problem::standard(DEMO_DEPTH, &["x"], &[], vec![
                Example::new([("x", 2)], 8),
                Example::new([("x", 3)], 27),
                Example::new([("x", 4)], 64),
            ]),
        ],
        "1a2" | "1b" => vec![
            Problem::standard(DEMO_DEPTH, &["x", "y"], &[-1, 5], piecewise()),
        ],
        _ => return None,
    };

    Some(suite)
}
