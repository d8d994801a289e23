//! Expression definitions for query execution.
//!
//! This module provides:
//! - Expression AST with canonical display labels
//! - Operator semantics with SQL three-valued NULL logic
//! - CAST conversions
//! - LIKE/RLIKE pattern compilation
//!
//! Evaluation against rows lives in the executor, since it needs the
//! execution context to resolve fields and aggregate groups.

pub mod error;
pub mod expr;
pub mod operator;
pub mod pattern;

pub use error::{ExpressionError, ExpressionResult};
pub use expr::{
    Expr, ExprKind, FrameBound, FrameRange, LimitClause, OrderItem, SelectItem, SetQuantifier,
    SortOrder, WindowSpec,
};
pub use operator::{BinaryOperator, CastType, UnaryOperator};
pub use pattern::{PatternCache, PatternKind};
