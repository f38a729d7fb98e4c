pub mod expression;
pub mod session;

pub use expression::{
    apply_basic_operation, evaluate, evaluate_expression, tokenize, EvalError, Operator, Token,
    VariableBindings,
};
pub use session::{Session, SessionError, SessionId, SessionRegistry, SessionState};
