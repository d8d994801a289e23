//! Error types for expression evaluation.

use crate::access::DataType;
use thiserror::Error;

/// Errors raised while applying an operator to already evaluated values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Operand kinds the operator is not defined for
    #[error("Invalid operand types for operator {operator}: left={left}, right={right}")]
    InvalidOperandTypes {
        operator: String,
        left: String,
        right: String,
    },

    /// A single operand of the wrong kind
    #[error("Type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: DataType,
        actual: String,
        context: String,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Cannot cast {value} to {target}")]
    InvalidCast { value: String, target: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
