// SQL Abstract Syntax Tree (AST) definitions
//
// Expressions are parsed directly into `expression::Expr` nodes; only the
// statement structure lives here.

use crate::expression::{Expr, LimitClause, OrderItem, SelectItem, SetQuantifier};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub quantifier: Option<SetQuantifier>,
    pub projections: Vec<SelectItem>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<LimitClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub base: TableFactor,
    pub joins: Vec<Join>,
}

/// `LEFT [OUTER] JOIN factor ON condition`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableFactor,
    pub on: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table {
        name: String,
        alias: Option<String>,
    },
    Derived {
        subquery: Box<SelectStatement>,
        alias: String,
    },
}

impl TableFactor {
    /// Name the factor's rows are addressed by in the statement
    pub fn alias(&self) -> &str {
        match self {
            TableFactor::Table { name, alias } => alias.as_deref().unwrap_or(name),
            TableFactor::Derived { alias, .. } => alias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_alias() {
        let table = TableFactor::Table {
            name: "用户".to_string(),
            alias: None,
        };
        assert_eq!(table.alias(), "用户");

        let aliased = TableFactor::Table {
            name: "用户".to_string(),
            alias: Some("u".to_string()),
        };
        assert_eq!(aliased.alias(), "u");
    }
}
