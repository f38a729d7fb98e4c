//! Two-stack operator-precedence evaluator.

use thiserror::Error;
use tracing::{debug, trace};

use super::tokenizer::tokenize;
use super::types::{Operator, Token, VariableBindings};

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Identifier with no binding
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    /// Unbalanced parentheses or an operator without two operands
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),
    /// Operator symbol outside + - * /
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

/// Entry on the operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Operator(Operator),
    LeftParen,
}

/// Operand and operator stacks for a single pass
#[derive(Debug, Default)]
struct EvalState {
    operands: Vec<f64>,
    operators: Vec<Pending>,
}

impl EvalState {
    /// Pop one operator and two operands, push `a op b`
    fn pop_and_apply(&mut self) -> Result<(), EvalError> {
        let op = match self.operators.pop() {
            Some(Pending::Operator(op)) => op,
            Some(Pending::LeftParen) => {
                return Err(EvalError::MalformedExpression("unclosed '('".to_string()))
            }
            None => {
                return Err(EvalError::MalformedExpression("no operator to apply".to_string()))
            }
        };

        // b was pushed last
        let (b, a) = match (self.operands.pop(), self.operands.pop()) {
            (Some(b), Some(a)) => (b, a),
            _ => {
                return Err(EvalError::MalformedExpression(format!(
                    "operator '{}' is missing an operand",
                    op
                )))
            }
        };

        let result = op.apply(a, b);
        trace!(a, b, op = %op, result, "reduced");
        self.operands.push(result);
        Ok(())
    }

    fn push_operator(&mut self, op: Operator) -> Result<(), EvalError> {
        // >= keeps equal priorities left-associative
        while let Some(&Pending::Operator(top)) = self.operators.last() {
            if top.priority() >= op.priority() {
                self.pop_and_apply()?;
            } else {
                break;
            }
        }
        self.operators.push(Pending::Operator(op));
        Ok(())
    }

    fn close_paren(&mut self) -> Result<(), EvalError> {
        loop {
            match self.operators.last() {
                Some(Pending::Operator(_)) => self.pop_and_apply()?,
                Some(Pending::LeftParen) => {
                    self.operators.pop();
                    return Ok(());
                }
                None => {
                    return Err(EvalError::MalformedExpression(
                        "')' without matching '('".to_string(),
                    ))
                }
            }
        }
    }

    fn finish(mut self) -> Result<f64, EvalError> {
        while !self.operators.is_empty() {
            self.pop_and_apply()?;
        }

        match self.operands.as_slice() {
            // Nothing to compute
            [] => Ok(0.0),
            [value] => Ok(*value),
            rest => Err(EvalError::MalformedExpression(format!(
                "{} operands left without an operator",
                rest.len()
            ))),
        }
    }
}

/// Evaluate a token sequence, resolving identifiers against `bindings`.
///
/// `*` and `/` bind tighter than `+` and `-`; equal priorities associate left
/// to right. An empty sequence evaluates to `0.0`.
pub fn evaluate(tokens: &[Token], bindings: &VariableBindings) -> Result<f64, EvalError> {
    let mut state = EvalState::default();

    for token in tokens {
        match token {
            Token::Number(n) => state.operands.push(*n),
            Token::Identifier(name) => {
                let value = bindings
                    .get(name)
                    .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
                state.operands.push(value);
            }
            Token::LeftParen => state.operators.push(Pending::LeftParen),
            Token::RightParen => state.close_paren()?,
            Token::Operator(op) => state.push_operator(*op)?,
        }
    }

    state.finish()
}

/// Tokenize and evaluate an expression string
pub fn evaluate_expression(expression: &str, bindings: &VariableBindings) -> Result<f64, EvalError> {
    let tokens = tokenize(expression);
    debug!(expression, tokens = tokens.len(), "evaluating expression");

    let result = evaluate(&tokens, bindings);
    match &result {
        Ok(value) => debug!(expression, value, "evaluated"),
        Err(e) => debug!(expression, error = %e, "evaluation failed"),
    }
    result
}

/// Apply a single operator to two operands, bypassing the tokenizer
pub fn apply_basic_operation(a: f64, b: f64, operator: &str) -> Result<f64, EvalError> {
    let op: Operator = operator.parse()?;
    Ok(op.apply(a, b))
}
