//! LEFT OUTER JOIN.
//!
//! Candidate pairs are produced either by a sort-merge over a single
//! equality between one left and one right field, or by a plain cross
//! product. The ON condition is then evaluated over every candidate and each
//! left row without a surviving pair keeps one all-Null right row.

use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionResult};
use crate::access::{TableView, Value};
use crate::expression::{BinaryOperator, Expr, ExprKind};
use log::debug;
use std::cmp::Ordering;
use std::sync::Arc;

/// Left row index paired with a right row index, `None` for the Null row
type Pair = (usize, Option<usize>);

impl<'a> ExecutionContext<'a> {
    /// Joins `right` under `right_alias` onto the rows spanning
    /// `left_aliases`. Returns the alias list including the new view.
    pub fn left_join(
        &mut self,
        left_aliases: &[String],
        right_alias: &str,
        right: TableView,
        on: &Expr,
    ) -> ExecutionResult<Vec<String>> {
        if self.frame.view(right_alias).is_some() {
            return Err(ExecutionError::DuplicateAlias(right_alias.to_string()));
        }

        let pairs = if self.row_size() == 0 || right.is_empty() {
            (0..self.row_size()).map(|i| (i, None)).collect()
        } else {
            let candidates = match self.equi_join_keys(on, left_aliases, right_alias, &right) {
                Some((left_key, right_field)) => {
                    debug!("sort-merge join of {} on {}", right_alias, on);
                    self.sort_merge(&left_key, &right, &right_field)?
                }
                None => {
                    debug!("nested loop join of {} on {}", right_alias, on);
                    let right_len = right.len();
                    (0..self.row_size())
                        .flat_map(|i| (0..right_len).map(move |j| (i, Some(j))))
                        .collect()
                }
            };
            self.apply_join_condition(candidates, right_alias, &right, on)?
        };

        let lefts: Vec<usize> = pairs.iter().map(|(left, _)| *left).collect();
        let mut frame = self.frame.take(&lefts);
        frame.push_view(right_alias.to_string(), paired_view(&right, &pairs));
        self.register_fields(right_alias, &right.fields);
        self.replace_frame(frame);
        self.saw_plain_column = false;

        let mut aliases = left_aliases.to_vec();
        aliases.push(right_alias.to_string());
        Ok(aliases)
    }

    /// Evaluates `on` over the candidates and restores outer-join semantics
    fn apply_join_condition(
        &mut self,
        candidates: Vec<Pair>,
        right_alias: &str,
        right: &TableView,
        on: &Expr,
    ) -> ExecutionResult<Vec<Pair>> {
        let saved = self.frame.clone();
        let saved_memo = std::mem::take(&mut self.memo);

        let lefts: Vec<usize> = candidates.iter().map(|(left, _)| *left).collect();
        let mut frame = saved.take(&lefts);
        frame.push_view(right_alias.to_string(), paired_view(right, &candidates));
        self.register_fields(right_alias, &right.fields);
        self.replace_frame(frame);

        let mut pairs = Vec::new();
        let mut start = 0;
        while start < candidates.len() {
            // Candidates of one left row are contiguous
            let left = candidates[start].0;
            let mut end = start;
            let mut matched = false;
            while end < candidates.len() && candidates[end].0 == left {
                if candidates[end].1.is_some()
                    && self.evaluate(on, end, false)?.truthiness() == Some(true)
                {
                    pairs.push(candidates[end]);
                    matched = true;
                }
                end += 1;
            }
            if !matched {
                pairs.push((left, None));
            }
            start = end;
        }

        self.frame = saved;
        self.memo = saved_memo;
        Ok(pairs)
    }

    /// Left key expression and right field of an equality that can drive a
    /// sort-merge join
    fn equi_join_keys(
        &self,
        on: &Expr,
        left_aliases: &[String],
        right_alias: &str,
        right: &TableView,
    ) -> Option<(Expr, String)> {
        let ExprKind::Binary {
            op: BinaryOperator::Eq,
            left,
            right: other,
        } = &on.kind
        else {
            return None;
        };
        let a = self.key_owner(left, right_alias, right)?;
        let b = self.key_owner(other, right_alias, right)?;
        if a.0 == b.0 {
            return None;
        }

        let left_side = |owner: &(String, String)| {
            left_aliases.contains(&owner.0)
                && self
                    .frame
                    .view(&owner.0)
                    .map_or(false, |view| view.has_field(&owner.1))
        };
        if a.0 == right_alias && left_side(&b) {
            Some((other.as_ref().clone(), a.1))
        } else if b.0 == right_alias && left_side(&a) {
            Some((left.as_ref().clone(), b.1))
        } else {
            None
        }
    }

    /// Owning alias and field name of a field access
    fn key_owner(&self, expr: &Expr, right_alias: &str, right: &TableView) -> Option<(String, String)> {
        match &expr.kind {
            ExprKind::QualifiedField { table, field } => Some((table.clone(), field.clone())),
            ExprKind::Field(name) => {
                let on_right = right.has_field(name);
                let on_left = self.knows_field(name);
                match (on_left, on_right) {
                    (true, true) => None,
                    (false, true) => Some((right_alias.to_string(), name.clone())),
                    (true, false) => self
                        .direct_owner(name)
                        .map(|owner| (owner.to_string(), name.clone())),
                    (false, false) => None,
                }
            }
            _ => None,
        }
    }

    fn sort_merge(
        &mut self,
        left_key: &Expr,
        right: &TableView,
        right_field: &str,
    ) -> ExecutionResult<Vec<Pair>> {
        let mut left = Vec::with_capacity(self.row_size());
        for i in 0..self.row_size() {
            left.push((self.evaluate(left_key, i, false)?, i));
        }
        let mut right_keys: Vec<(Value, usize)> = (0..right.len())
            .map(|j| (right.value(j, right_field), j))
            .collect();
        left.sort_by(|a, b| a.0.sort_cmp(&b.0));
        right_keys.sort_by(|a, b| a.0.sort_cmp(&b.0));

        let mut pairs = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < left.len() {
            if j >= right_keys.len() {
                pairs.push((left[i].1, None));
                i += 1;
                continue;
            }
            let (left_value, right_value) = (&left[i].0, &right_keys[j].0);
            // Null never joins Null
            if left_value.is_null() && right_value.is_null() {
                j += 1;
                continue;
            }
            match left_value.sort_cmp(right_value) {
                Ordering::Less => {
                    pairs.push((left[i].1, None));
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    let left_end = run_end(&left, i);
                    let right_end = run_end(&right_keys, j);
                    for (_, l) in &left[i..left_end] {
                        for (_, r) in &right_keys[j..right_end] {
                            pairs.push((*l, Some(*r)));
                        }
                    }
                    i = left_end;
                    j = right_end;
                }
            }
        }
        Ok(pairs)
    }
}

/// End of the run of keys equal to `keys[start]`
fn run_end(keys: &[(Value, usize)], start: usize) -> usize {
    let mut end = start + 1;
    while end < keys.len() && keys[end].0.sort_cmp(&keys[start].0) == Ordering::Equal {
        end += 1;
    }
    end
}

/// Right rows for `pairs`, sharing one Null row for the unmatched ones
fn paired_view(right: &TableView, pairs: &[Pair]) -> TableView {
    let null_row = right.null_row();
    let rows = pairs
        .iter()
        .map(|(_, r)| match r.and_then(|j| right.rows.get(j)) {
            Some(row) => Arc::clone(row),
            None => Arc::clone(&null_row),
        })
        .collect();
    TableView::from_shared(rows, right.fields.clone())
}
