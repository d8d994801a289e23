use crate::expression::ExpressionError;
use thiserror::Error;

/// Errors that abort the current statement
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    // Resolution
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown field {field} in table {table}")]
    UnknownTableField { table: String, field: String },

    #[error("Field {field} is ambiguous, it is provided by tables {tables}")]
    AmbiguousField { field: String, tables: String },

    #[error("Table alias {0} is used more than once")]
    DuplicateAlias(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    // Arity and modifiers
    #[error("Function {function} does not accept the {modifier} modifier")]
    UnsupportedModifier { function: String, modifier: String },

    #[error("The ALL modifier is not supported")]
    AllNotSupported,

    #[error("Window function {0} requires an OVER clause")]
    MissingOver(String),

    #[error("Function {0} cannot be used with OVER")]
    NotWindowFunction(String),

    #[error("Window result {0} was not computed")]
    MissingWindowResult(String),

    #[error("Invalid window frame: start row {start} is after end row {end}")]
    InvalidFrame { start: i64, end: i64 },

    #[error("Aggregate functions cannot be mixed with plain columns without GROUP BY")]
    MixedAggregate,

    // Duplication
    #[error("Duplicate GROUP BY expression: {0}")]
    DuplicateGroupKey(String),

    #[error("Duplicate output column: {0}")]
    DuplicateColumn(String),

    #[error("View {alias} has {actual} rows but the statement has {expected}")]
    RowCountMismatch {
        alias: String,
        expected: usize,
        actual: usize,
    },

    #[error("No statement is being executed")]
    NoActiveStatement,

    #[error("Function {name} failed: {message}")]
    Function { name: String, message: String },
}

/// Result type for execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;
