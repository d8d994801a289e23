//! Executor layer for query execution.
//!
//! A statement runs inside an [`ExecutionContext`], which owns a row-aligned
//! [`Frame`] of table views plus the per-row group, partition and window
//! channels. Every relational operator is a method on the context that
//! rewrites the whole frame at once, so all channels always have the same
//! length. Operators are fully materialized; there is no streaming between
//! them.

pub mod aggregate;
pub mod context;
pub mod error;
pub mod evaluate;
pub mod filter;
pub mod join;
pub mod limit;
pub mod projection;
pub mod sort;
pub mod statement;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{GroupMode, Grouping};
pub use context::{ExecutionContext, Frame, RowCache};
pub use error::{ExecutionError, ExecutionResult};
pub use sort::SortOutcome;
pub use statement::StatementExecutor;
