//! Arithmetic expression evaluation.
//!
//! Provides:
//! - A lenient tokenizer for numbers, variables, `+ - * /` and parentheses
//! - A two-stack operator-precedence evaluator
//! - A case-insensitive variable binding table

pub mod types;
pub mod tokenizer;
pub mod evaluator;


pub use types::{Operator, Token, VariableBindings};
pub use tokenizer::tokenize;
pub use evaluator::{apply_basic_operation, evaluate, evaluate_expression, EvalError};
