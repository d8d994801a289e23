//! Session holding the tables and functions queries run against.
//!
//! A session lives for the whole process. Statements take read locks on both
//! registries for their duration, registration takes a write lock, so one
//! `Arc<Session>` can serve queries from several threads.

use crate::access::{Row, TableView, Value};
use crate::executor::StatementExecutor;
use crate::function::{Function, FunctionRegistry};
use crate::sql::parser::Parser;
use anyhow::{Context, Result};
use log::{debug, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

/// Rows and output columns of a statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub fields: Vec<String>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `field` in row order, Null where a row lacks it
    pub fn column(&self, field: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

impl From<TableView> for QueryResult {
    fn from(view: TableView) -> Self {
        QueryResult {
            rows: view.rows.iter().map(|row| row.as_ref().clone()).collect(),
            fields: view.fields,
        }
    }
}

pub struct Session {
    tables: RwLock<HashMap<String, TableView>>,
    functions: RwLock<FunctionRegistry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session with the built-in functions registered
    pub fn new() -> Self {
        Session {
            tables: RwLock::new(HashMap::new()),
            functions: RwLock::new(FunctionRegistry::with_builtins()),
        }
    }

    /// Registers `rows` as table `name`. Without `fields` the field set is
    /// taken from the keys of the first row.
    pub fn register_table(&self, name: &str, rows: Vec<Row>, fields: Option<Vec<String>>) -> Result<()> {
        let view = TableView::new(rows, fields);
        view.validate()
            .with_context(|| format!("Invalid rows for table {}", name))?;
        self.register_view(name, view);
        Ok(())
    }

    /// Registers an existing view as table `name`, replacing any previous
    /// table of that name
    pub fn register_view(&self, name: &str, view: TableView) {
        debug!("registering table {} with {} rows", name, view.len());
        if self.tables.write().insert(name.to_string(), view).is_some() {
            warn!("Table {} was replaced", name);
        }
    }

    /// Registers or overrides a function. Names are case-insensitive.
    pub fn register_function(&self, name: &str, function: Function) {
        if self.functions.write().register(name, function).is_some() {
            debug!("function {} was overridden", name);
        }
    }

    /// Registered table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered function names, sorted
    pub fn function_names(&self) -> Vec<String> {
        self.functions.read().names()
    }

    /// Parses and executes one SELECT statement
    pub fn execute_sql(&self, sql: &str) -> Result<QueryResult> {
        debug!("Executing SQL: {}", sql);

        let statement = Parser::new(sql)
            .and_then(|mut parser| parser.parse())
            .context("Failed to parse SQL")?;

        let tables = self.tables.read();
        let functions = self.functions.read();
        let mut executor = StatementExecutor::new(&tables, &functions);
        let view = executor.execute(&statement)?;

        debug!("Statement returned {} rows", view.len());
        Ok(QueryResult::from(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_register_and_query() -> Result<()> {
        let session = Session::new();
        session.register_table(
            "t",
            vec![row(&[("a", Value::from(1))]), row(&[("a", Value::from(2))])],
            None,
        )?;
        let result = session.execute_sql("select a * 10 as b from t order by a desc")?;
        assert_eq!(result.fields, vec!["b".to_string()]);
        assert_eq!(result.column("b"), vec![Value::from(20), Value::from(10)]);
        Ok(())
    }

    #[test]
    fn test_register_replaces_table() -> Result<()> {
        let session = Session::new();
        session.register_table("t", vec![row(&[("a", Value::from(1))])], None)?;
        session.register_table("t", vec![], Some(vec!["a".to_string()]))?;
        assert_eq!(session.table_names(), vec!["t".to_string()]);
        assert!(session.execute_sql("select a from t")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_register_rejects_undeclared_field() {
        let session = Session::new();
        let result = session.register_table(
            "t",
            vec![row(&[("a", Value::from(1)), ("b", Value::from(2))])],
            Some(vec!["a".to_string()]),
        );
        assert!(result.is_err());
        assert!(session.table_names().is_empty());
    }

    #[test]
    fn test_custom_function() -> Result<()> {
        let session = Session::new();
        session.register_function(
            "double",
            Function::scalar(|args| match args.first() {
                Some(Value::Number(n)) => Ok(Value::Number(n * 2.0)),
                _ => Ok(Value::Null),
            }),
        );
        assert!(session.function_names().contains(&"double".to_string()));
        let result = session.execute_sql("select DOUBLE(21) as x")?;
        assert_eq!(result.column("x"), vec![Value::from(42)]);
        Ok(())
    }

    #[test]
    fn test_errors_are_reported() {
        let session = Session::new();
        assert!(session.execute_sql("select from").is_err());
        let err = session.execute_sql("select * from nowhere").err();
        assert_eq!(err.map(|e| e.to_string()), Some("Unknown table: nowhere".to_string()));
    }
}
