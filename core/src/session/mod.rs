//! Calculator sessions.
//!
//! A session owns a binding table and remembers the last expression it
//! evaluated successfully. Sessions are independent of each other; nothing in
//! this crate is process-global.

pub mod registry;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::expression::{apply_basic_operation, evaluate_expression, EvalError, VariableBindings};

pub use registry::SessionRegistry;

/// Unique identifier for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("No current expression to execute")]
    NoCurrentExpression,
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Serializable view of a session.
///
/// Infinite or NaN variable values (for example a stored `5/0` result) have no
/// JSON form: serde_json writes them as `null`, and that `null` does not
/// deserialize back into a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_expression: String,
    pub variables: HashMap<String, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    id: SessionId,
    /// Last expression evaluated successfully, empty if none
    current_expression: String,
    bindings: VariableBindings,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn current_expression(&self) -> &str {
        &self.current_expression
    }

    pub fn bindings(&self) -> &VariableBindings {
        &self.bindings
    }

    /// Evaluate `expression` against this session's variables.
    ///
    /// On success the expression becomes the current expression.
    pub fn evaluate(&mut self, expression: &str) -> Result<f64, EvalError> {
        let value = evaluate_expression(expression, &self.bindings)?;
        self.current_expression = expression.to_string();
        Ok(value)
    }

    /// Apply one operator directly and record it as `(a op b)`
    pub fn apply(&mut self, a: f64, b: f64, operator: &str) -> Result<f64, EvalError> {
        let value = apply_basic_operation(a, b, operator)?;
        self.current_expression = format!("({:?} {} {:?})", a, operator, b);
        Ok(value)
    }

    /// Re-run the current expression against the current variables
    pub fn execute(&self) -> Result<f64, SessionError> {
        if self.current_expression.is_empty() {
            return Err(SessionError::NoCurrentExpression);
        }
        Ok(evaluate_expression(&self.current_expression, &self.bindings)?)
    }

    pub fn set_variable(&mut self, name: &str, value: f64) {
        debug!(session = %self.id, name, value, "set variable");
        self.bindings.set(name, value);
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }

    pub fn snapshot_bindings(&self) -> HashMap<String, f64> {
        self.bindings.snapshot()
    }

    /// Forget the current expression and all variables
    pub fn clear(&mut self) {
        debug!(session = %self.id, "clearing session");
        self.current_expression.clear();
        self.bindings.clear();
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            current_expression: self.current_expression.clone(),
            variables: self.bindings.snapshot(),
        }
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[test]
    fn test_variable_substitution() {
        let mut session = Session::new();
        session.set_variable("x", 5.0);

        let result = session.evaluate("x*2").unwrap();
        assert!((result - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_evaluate_records_current_expression() {
        let mut session = Session::new();
        session.evaluate("1 + 1").unwrap();
        assert_eq!(session.current_expression(), "1 + 1");
    }

    #[test]
    fn test_failed_evaluate_keeps_current_expression() {
        let mut session = Session::new();
        session.evaluate("2 * 3").unwrap();

        let result = session.evaluate("missing + 1");
        assert_eq!(result, Err(EvalError::UnknownVariable("missing".to_string())));
        assert_eq!(session.current_expression(), "2 * 3");
    }

    #[test]
    fn test_apply_records_expression() {
        let mut session = Session::new();
        let result = session.apply(6.0, 3.0, "/").unwrap();
        assert_eq!(result, 2.0);
        assert_eq!(session.current_expression(), "(6.0 / 3.0)");

        // The recorded form evaluates to the same value
        assert_eq!(session.execute(), Ok(2.0));
    }

    #[test]
    fn test_apply_unsupported_keeps_state() {
        let mut session = Session::new();
        let result = session.apply(1.0, 2.0, "%");
        assert_eq!(result, Err(EvalError::UnsupportedOperator("%".to_string())));
        assert_eq!(session.current_expression(), "");
    }

    #[test]
    fn test_execute_without_expression() {
        let session = Session::new();
        assert_eq!(session.execute(), Err(SessionError::NoCurrentExpression));
    }

    #[test]
    fn test_execute_sees_updated_variables() {
        let mut session = Session::new();
        session.set_variable("n", 2.0);
        assert_eq!(session.evaluate("n * 10"), Ok(20.0));

        session.set_variable("N", 3.0);
        assert_eq!(session.execute(), Ok(30.0));
    }

    #[test]
    fn test_execute_reports_eval_errors() {
        let mut session = Session::new();
        session.set_variable("n", 2.0);
        session.evaluate("n + 1").unwrap();
        session.clear_bindings();

        assert_eq!(
            session.execute(),
            Err(SessionError::Eval(EvalError::UnknownVariable("n".to_string())))
        );
    }

    #[test]
    fn test_clear_bindings_keeps_expression() {
        let mut session = Session::new();
        session.set_variable("a", 1.0);
        session.evaluate("a").unwrap();
        session.clear_bindings();

        assert!(session.snapshot_bindings().is_empty());
        assert_eq!(session.current_expression(), "a");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = Session::new();
        session.set_variable("a", 1.0);
        session.evaluate("a + 1").unwrap();
        session.clear();

        assert_eq!(session.current_expression(), "");
        assert!(session.bindings().is_empty());
        assert_eq!(session.execute(), Err(SessionError::NoCurrentExpression));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = Session::new();
        session.set_variable("Speed", 12.0);

        let snapshot = session.snapshot_bindings();
        session.set_variable("speed", 99.0);

        assert_eq!(snapshot.get("speed"), Some(&12.0));
        assert_eq!(session.bindings().get("speed"), Some(99.0));
    }

    #[test]
    fn test_state_serializes() {
        let mut session = Session::new();
        session.set_variable("x", 1.5);
        session.evaluate("x * 2").unwrap();

        let json = serde_json::to_value(session.state()).unwrap();
        assert_eq!(json["current_expression"], "x * 2");
        assert_eq!(json["variables"]["x"], 1.5);

        let restored: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, session.state());
    }

    #[test]
    fn test_session_id_display_and_serde() {
        let uuid = Uuid::new_v4();
        let id = SessionId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());

        let json = serde_json::to_string(&id).unwrap();
        let restored: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);

        assert_ne!(SessionId::new(), SessionId::new());
        assert_eq!(Session::with_id(id).id(), id);
    }

    #[test]
    fn test_state_with_infinite_value_does_not_round_trip() {
        let mut session = Session::new();
        let value = session.evaluate("5/0").unwrap();
        session.set_variable("big", value);

        let json = serde_json::to_value(session.state()).unwrap();
        assert!(json["variables"]["big"].is_null());
        assert!(serde_json::from_value::<SessionState>(json).is_err());
    }

    #[test]
    fn test_session_error_messages() {
        assert_eq!(
            SessionError::NoCurrentExpression.to_string(),
            "No current expression to execute"
        );
        assert_eq!(
            SessionError::from(EvalError::UnknownVariable("q".to_string())).to_string(),
            "Unknown variable: q"
        );
    }
}
