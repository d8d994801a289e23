//! Clause-ordered execution of a parsed SELECT statement.
//!
//! Every statement gets its own [`ExecutionContext`] pushed onto an explicit
//! stack. A derived table in FROM executes on top of it and is popped before
//! its result is registered in the enclosing statement, so field resolution
//! never leaks between nesting levels.

use super::aggregate::GroupMode;
use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionResult};
use crate::access::TableView;
use crate::function::FunctionRegistry;
use crate::sql::{SelectStatement, TableFactor};
use log::debug;
use std::collections::HashMap;

pub struct StatementExecutor<'a> {
    tables: &'a HashMap<String, TableView>,
    functions: &'a FunctionRegistry,
    stack: Vec<ExecutionContext<'a>>,
}

impl<'a> StatementExecutor<'a> {
    pub fn new(tables: &'a HashMap<String, TableView>, functions: &'a FunctionRegistry) -> Self {
        Self {
            tables,
            functions,
            stack: Vec::new(),
        }
    }

    /// Runs `statement`, FROM → WHERE → GROUP BY → HAVING → SELECT (which
    /// covers windows, ORDER BY and LIMIT)
    pub fn execute(&mut self, statement: &SelectStatement) -> ExecutionResult<TableView> {
        self.stack.push(ExecutionContext::new(self.functions));
        debug!("executing statement at depth {}", self.stack.len());
        let result = self.run(statement);
        self.stack.pop();
        result
    }

    /// Number of statements currently being executed
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn current(&mut self) -> ExecutionResult<&mut ExecutionContext<'a>> {
        self.stack.last_mut().ok_or(ExecutionError::NoActiveStatement)
    }

    fn run(&mut self, statement: &SelectStatement) -> ExecutionResult<TableView> {
        match &statement.from {
            Some(from) => {
                let base = self.resolve_factor(&from.base)?;
                self.current()?.add_view(from.base.alias(), base)?;
                let mut aliases = vec![from.base.alias().to_string()];
                for join in &from.joins {
                    let right = self.resolve_factor(&join.table)?;
                    aliases = self
                        .current()?
                        .left_join(&aliases, join.table.alias(), right, &join.on)?;
                }
            }
            None => self.current()?.set_single_row(),
        }

        let context = self.current()?;
        if let Some(predicate) = &statement.where_clause {
            context.filter(predicate)?;
        }
        if !statement.group_by.is_empty() {
            context.group_by(&statement.group_by, GroupMode::Group)?;
        }
        if let Some(having) = &statement.having {
            context.filter(having)?;
        }
        context.select(
            &statement.projections,
            statement.quantifier,
            &statement.order_by,
            statement.limit.as_ref(),
        )
    }

    /// Table of a FROM factor. Registered tables are shared, derived tables
    /// are executed.
    fn resolve_factor(&mut self, factor: &TableFactor) -> ExecutionResult<TableView> {
        match factor {
            TableFactor::Table { name, .. } => self
                .tables
                .get(name)
                .cloned()
                .ok_or_else(|| ExecutionError::UnknownTable(name.clone())),
            TableFactor::Derived { subquery, .. } => self.execute(subquery),
        }
    }
}
