//! Access layer for in-memory tables.
//!
//! This module provides the data containers the engine operates on:
//!
//! - **Value**: dynamically typed cell value (Null, Number, String, Boolean, List)
//! - **DataType**: the kind of a non-null value, used in error reporting
//! - **Row**: a mapping from field name to value
//! - **TableView**: an ordered sequence of shared rows plus its field set
//!
//! Rows are reference counted so that views, groups and window partitions can
//! share them without copying cell data.

pub mod table;
pub mod value;

pub use table::{Row, TableView};
pub use value::{DataType, Value};
