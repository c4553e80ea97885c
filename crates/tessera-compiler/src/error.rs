//! Interpreter errors

use crate::ir::VariableId;
use thiserror::Error;

/// Interpreter result type
pub type InterpretResult<T> = Result<T, InterpretError>;

/// Runtime failure while interpreting IR
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    /// `value!!` on null
    #[error("Null assertion failed")]
    NullAssertion,

    /// Array access outside `0 until length`
    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    /// Progression built with a zero step
    #[error("Step is zero")]
    ZeroStep,

    /// `step` called with a non-positive value
    #[error("Step must be positive, was: {0}")]
    NonPositiveStep(i64),

    /// `next()` on an exhausted iterator
    #[error("No more elements")]
    NoSuchElement,

    /// Operand of the wrong kind
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Read or write of a variable that was never declared
    #[error("Unknown variable: {0}")]
    UnknownVariable(VariableId),

    /// Loop iterations exceeded the configured limit
    #[error("Iteration limit of {0} exceeded")]
    IterationLimit(u64),

    /// Failure reported by the call host
    #[error("Call failed: {0}")]
    Host(String),
}
