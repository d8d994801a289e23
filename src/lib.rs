pub mod access;
pub mod executor;
pub mod expression;
pub mod function;
pub mod session;
pub mod sql;

pub use access::{Row, TableView, Value};
pub use function::{Function, FunctionRegistry};
pub use session::{QueryResult, Session};
