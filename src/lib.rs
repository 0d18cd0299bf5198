//! Bottom-up enumerative synthesis of small integer/boolean expressions
//! from input/output examples, pruned by observational equivalence.

pub mod expr;
pub mod ops;
pub mod problem;
pub mod search;
pub mod synth;

pub use expr::{Expr, Value};
pub use problem::Problem;
pub use search::{synthesize, synthesize_restricted, Outcome, SynthError, Synthesis};
pub use synth::Example;
