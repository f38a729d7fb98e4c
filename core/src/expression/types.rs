//! Core types for the expression system.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::evaluator::EvalError;

/// The four supported binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Map a single character to an operator
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    /// The character this operator is written as
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// Binding strength. Higher binds tighter.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    /// Compute `a op b`.
    ///
    /// A zero divisor (either sign) gives positive infinity, whatever the
    /// numerator is. Everything else is plain f64 arithmetic.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => {
                if b == 0.0 {
                    f64::INFINITY
                } else {
                    a / b
                }
            }
        }
    }
}

impl FromStr for Operator {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_symbol(c).ok_or_else(|| EvalError::UnsupportedOperator(s.to_string()))
            }
            _ => Err(EvalError::UnsupportedOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Lexical unit of an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// Lowercased variable name
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

/// Variable names are case-insensitive; they are stored lowercased.
fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Name -> value table that identifiers are resolved against.
///
/// Owned by the caller (usually a [`crate::session::Session`]) and only ever
/// borrowed by the evaluator.
///
/// Serializes as a plain name -> number map. Deserializing replays the
/// entries through [`VariableBindings::set`] in document order, so of two keys
/// differing only by case the later one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "HashMap<String, f64>")]
pub struct VariableBindings {
    values: HashMap<String, f64>,
}

impl VariableBindings {
    /// Create an empty binding table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding
    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(normalize_name(name), value);
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(&normalize_name(name)).copied()
    }

    /// Whether `name` has a binding, ignoring case
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&normalize_name(name))
    }

    /// Drop every binding
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Owned copy of the current bindings
    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.values.clone()
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'de> Deserialize<'de> for VariableBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BindingsVisitor;

        impl<'de> Visitor<'de> for BindingsVisitor {
            type Value = VariableBindings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of variable names to numbers")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut bindings = VariableBindings::new();
                while let Some((name, value)) = map.next_entry::<String, f64>()? {
                    bindings.set(&name, value);
                }
                Ok(bindings)
            }
        }

        deserializer.deserialize_map(BindingsVisitor)
    }
}

impl From<VariableBindings> for HashMap<String, f64> {
    fn from(bindings: VariableBindings) -> Self {
        bindings.values
    }
}
