//! SELECT list evaluation, including DISTINCT, ORDER BY and LIMIT.
//!
//! Wildcards are expanded before anything is evaluated. Window functions in
//! the list are computed first, then the rows are ordered and limited, and
//! finally every item is evaluated per row. DISTINCT projects once, groups
//! the projected rows by all of their columns in a fresh context and
//! projects again, so ordering and limiting happen after duplicates are
//! gone.

use super::aggregate::GroupMode;
use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionResult};
use crate::access::{Row, TableView};
use crate::expression::{Expr, ExprKind, LimitClause, OrderItem, SelectItem, SetQuantifier};
use std::collections::{HashMap, HashSet};

/// Alias of the single view that DISTINCT regroups
const DISTINCT_VIEW: &str = "distinct_result";

impl<'a> ExecutionContext<'a> {
    /// Produces the statement result and resets the context
    pub fn select(
        &mut self,
        items: &[SelectItem],
        quantifier: Option<SetQuantifier>,
        order: &[OrderItem],
        limit: Option<&LimitClause>,
    ) -> ExecutionResult<TableView> {
        if quantifier == Some(SetQuantifier::All) {
            return Err(ExecutionError::AllNotSupported);
        }
        let distinct = quantifier == Some(SetQuantifier::Distinct);

        let exprs = self.expand_wildcards(items)?;
        let names = output_names(&exprs)?;

        for expr in &exprs {
            if let Some((spec, label)) = expr.window_spec() {
                self.window_function(spec, label)?;
            }
        }
        if !distinct {
            if !order.is_empty() {
                let order = self.resolve_order_aliases(order, &exprs);
                self.order_by(&order)?;
            }
            if let Some(limit) = limit {
                self.limit(limit);
            }
        }

        if self.row_size() == 0 {
            if self.grouped && self.empty_group.is_none() {
                // HAVING removed every group
                self.reset();
                return self.finish(TableView::empty(names), distinct, order, limit);
            }
            self.source_empty = true;
            let mut frame = self.frame.null_extended();
            frame.groups[0] = self.empty_group.clone();
            self.replace_frame(frame);
        }

        let mut rows = Vec::new();
        let mut row = 0;
        while row < self.row_size() {
            let mut out = Row::with_capacity(exprs.len());
            for (expr, name) in exprs.iter().zip(&names) {
                let value = self.evaluate(expr, row, false)?;
                out.insert(name.clone(), value);
            }
            rows.push(out);
            row += 1;
        }
        // Only an aggregate turns an empty source into a row
        if self.source_empty && !self.aggregated {
            rows.clear();
        }

        self.reset();
        self.finish(TableView::new(rows, Some(names)), distinct, order, limit)
    }

    fn finish(
        &mut self,
        view: TableView,
        distinct: bool,
        order: &[OrderItem],
        limit: Option<&LimitClause>,
    ) -> ExecutionResult<TableView> {
        if !distinct {
            return Ok(view);
        }
        let keys: Vec<Expr> = view.fields.iter().map(|f| Expr::field(f.as_str())).collect();
        let items: Vec<SelectItem> = keys.iter().cloned().map(SelectItem::Expr).collect();

        let mut regrouped = ExecutionContext::new(self.functions());
        regrouped.add_view(DISTINCT_VIEW, view)?;
        regrouped.group_by(&keys, GroupMode::Group)?;
        regrouped.select(&items, None, order, limit)
    }

    fn expand_wildcards(&self, items: &[SelectItem]) -> ExecutionResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        for item in items {
            match item {
                SelectItem::Expr(expr) => exprs.push(expr.clone()),
                SelectItem::Wildcard => {
                    for (alias, view) in self.frame.views() {
                        exprs.extend(self.view_columns(alias, view));
                    }
                }
                SelectItem::QualifiedWildcard(alias) => {
                    let view = self
                        .frame
                        .view(alias)
                        .ok_or_else(|| ExecutionError::UnknownTable(alias.clone()))?;
                    exprs.extend(self.view_columns(alias, view));
                }
            }
        }
        Ok(exprs)
    }

    /// Field accesses for every field of `view`, bare where unambiguous
    fn view_columns(&self, alias: &str, view: &TableView) -> Vec<Expr> {
        view.fields
            .iter()
            .map(|field| {
                if self.direct_owner(field) == Some(alias) {
                    Expr::field(field.as_str())
                } else {
                    Expr::qualified_field(alias, field.as_str())
                }
            })
            .collect()
    }

    /// Replaces ORDER BY references to SELECT aliases by the aliased
    /// expression. Real fields take precedence.
    fn resolve_order_aliases(&self, order: &[OrderItem], exprs: &[Expr]) -> Vec<OrderItem> {
        let aliases: HashMap<&str, &Expr> = exprs
            .iter()
            .filter_map(|expr| match &expr.kind {
                ExprKind::Alias { inner, alias } => Some((alias.as_str(), inner.as_ref())),
                _ => None,
            })
            .collect();
        order
            .iter()
            .map(|item| match &item.expr.kind {
                ExprKind::Field(name) if !self.knows_field(name) => match aliases.get(name.as_str()) {
                    Some(inner) => OrderItem::new((*inner).clone(), item.order),
                    None => item.clone(),
                },
                _ => item.clone(),
            })
            .collect()
    }
}

/// Output column names. A qualified field is named by its bare field name
/// unless another column would claim the same name.
fn output_names(exprs: &[Expr]) -> ExecutionResult<Vec<String>> {
    let bare = |expr: &Expr| match &expr.kind {
        ExprKind::QualifiedField { field, .. } => field.clone(),
        _ => expr.label.clone(),
    };
    let mut claims: HashMap<String, usize> = HashMap::new();
    for expr in exprs {
        *claims.entry(bare(expr)).or_default() += 1;
    }

    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let name = match &expr.kind {
            ExprKind::QualifiedField { field, .. } if claims.get(field) == Some(&1) => field.clone(),
            _ => expr.label.clone(),
        };
        if !seen.insert(name.clone()) {
            return Err(ExecutionError::DuplicateColumn(name));
        }
        names.push(name);
    }
    Ok(names)
}
