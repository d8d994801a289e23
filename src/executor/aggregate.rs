//! Hash grouping for GROUP BY and window partitions.
//!
//! Rows are bucketed by the tuple of grouping values, where Null equals Null.
//! Groups keep first-occurrence order. In [`GroupMode::Group`] the context
//! is collapsed to one row per group: grouping expressions that are field
//! accesses stay projectable as columns of their owning view, other
//! grouping expressions are saved in the frame's group key channel, and
//! every row points at its group's member rows for aggregate calls.

use super::context::{ExecutionContext, Frame, RowCache};
use super::error::{ExecutionError, ExecutionResult};
use crate::access::{Row, TableView, Value};
use crate::expression::{Expr, ExprKind};
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// GROUP BY: collapse to one row per group
    Group,
    /// PARTITION BY: record each row's partition, keep the rows
    Frame,
}

/// One group and the rows it was built from
#[derive(Debug, Clone)]
pub struct Grouping {
    /// Row indices of the members, in input order
    pub members: Vec<usize>,
    pub frame: Arc<Frame>,
}

/// Grouping key with Null == Null and numbers compared by value
#[derive(Debug, Clone)]
struct GroupKey(Vec<Value>);

fn normalized_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

fn key_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Number(x), Value::Number(y)) => normalized_bits(*x) == normalized_bits(*y),
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| key_eq(a, b))
        }
        _ => a.sql_eq(b),
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Boolean(b) => b.hash(state),
        Value::Number(n) => normalized_bits(*n).hash(state),
        Value::String(s) => s.hash(state),
        Value::List(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| key_eq(a, b))
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.0 {
            hash_value(value, state);
        }
    }
}

impl<'a> ExecutionContext<'a> {
    pub fn group_by(&mut self, exprs: &[Expr], mode: GroupMode) -> ExecutionResult<Vec<Grouping>> {
        let mut labels = HashSet::new();
        for expr in exprs {
            if !labels.insert(expr.label.as_str()) {
                return Err(ExecutionError::DuplicateGroupKey(expr.label.clone()));
            }
        }

        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut buckets: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
        let mut row = 0;
        while row < self.row_size() {
            let key = exprs
                .iter()
                .map(|expr| self.evaluate(expr, row, false))
                .collect::<ExecutionResult<Vec<_>>>()?;
            match index.entry(GroupKey(key.clone())) {
                Entry::Occupied(entry) => buckets[*entry.get()].1.push(row),
                Entry::Vacant(entry) => {
                    entry.insert(buckets.len());
                    buckets.push((key, vec![row]));
                }
            }
            row += 1;
        }
        debug!(
            "{:?} mode split {} rows into {} groups",
            mode,
            self.row_size(),
            buckets.len()
        );

        let groupings: Vec<Grouping> = buckets
            .iter()
            .map(|(_, members)| Grouping {
                members: members.clone(),
                frame: Arc::new(self.frame.take(members)),
            })
            .collect();

        match mode {
            GroupMode::Frame => {
                for grouping in &groupings {
                    for &member in &grouping.members {
                        if let Some(slot) = self.frame.partitions.get_mut(member) {
                            *slot = Some(Arc::clone(&grouping.frame));
                        }
                    }
                }
            }
            GroupMode::Group => self.collapse_groups(exprs, &buckets, &groupings)?,
        }
        self.saw_plain_column = false;
        Ok(groupings)
    }

    fn collapse_groups(
        &mut self,
        exprs: &[Expr],
        buckets: &[(Vec<Value>, Vec<usize>)],
        groupings: &[Grouping],
    ) -> ExecutionResult<()> {
        // (alias, field, key position) of field keys, (label, position) of the rest
        let mut columns: Vec<(String, String, usize)> = Vec::new();
        let mut saved: Vec<(String, usize)> = Vec::new();
        for (position, expr) in exprs.iter().enumerate() {
            match &expr.kind {
                ExprKind::Field(name) => {
                    let alias = self.resolve_field(name)?.to_string();
                    columns.push((alias, name.clone(), position));
                }
                ExprKind::QualifiedField { table, field } => {
                    columns.push((table.clone(), field.clone(), position));
                }
                _ => saved.push((expr.label.clone(), position)),
            }
        }

        let mut frame = Frame::with_len(buckets.len());
        for (alias, view) in self.frame.views() {
            let mut fields: Vec<String> = Vec::new();
            let mut positions: Vec<usize> = Vec::new();
            for (owner, field, position) in &columns {
                if owner == alias && !fields.contains(field) {
                    fields.push(field.clone());
                    positions.push(*position);
                }
            }
            debug_assert!(fields.iter().all(|f| view.has_field(f)));
            let rows = buckets
                .iter()
                .map(|(key, _)| {
                    let row: Row = fields
                        .iter()
                        .zip(&positions)
                        .map(|(field, &position)| (field.clone(), key[position].clone()))
                        .collect();
                    Arc::new(row)
                })
                .collect();
            frame.push_view(alias.clone(), TableView::from_shared(rows, fields));
        }
        for (g, (key, _)) in buckets.iter().enumerate() {
            frame.group_keys[g] = saved
                .iter()
                .map(|(label, position)| (label.clone(), key[*position].clone()))
                .collect::<RowCache>();
            frame.groups[g] = Some(Arc::clone(&groupings[g].frame));
        }

        if buckets.is_empty() {
            self.empty_group = Some(Arc::new(self.frame.empty_like()));
        }
        self.frame = frame;
        self.memo = vec![RowCache::new(); buckets.len()];
        self.rebuild_field_tables();
        self.grouped = true;
        Ok(())
    }
}
