//! Row-aligned execution state of one statement.
//!
//! A [`Frame`] holds everything that is indexed by logical row: the named
//! views plus the reserved per-row channels (owning group, owning window
//! partition, computed window results and saved group keys). All of them
//! always have exactly `len` entries, and operators that change cardinality
//! replace the whole frame at once through [`Frame::take`].
//!
//! [`ExecutionContext`] wraps a frame with the field resolution tables, the
//! per-row memo and the aggregate bookkeeping flags.

use super::error::{ExecutionError, ExecutionResult};
use crate::access::{TableView, Value};
use crate::expression::PatternCache;
use crate::function::FunctionRegistry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Values keyed by expression label, one map per row
pub type RowCache = HashMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub(crate) len: usize,
    pub(crate) views: Vec<(String, TableView)>,
    /// Group each row belongs to after GROUP BY (or the implicit group)
    pub(crate) groups: Vec<Option<Arc<Frame>>>,
    /// Window partition each row belongs to
    pub(crate) partitions: Vec<Option<Arc<Frame>>>,
    /// Window function results by window label
    pub(crate) window_results: Vec<RowCache>,
    /// Values of non-field GROUP BY expressions by label
    pub(crate) group_keys: Vec<RowCache>,
}

fn pick<T: Clone + Default>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices
        .iter()
        .map(|&i| items.get(i).cloned().unwrap_or_default())
        .collect()
}

impl Frame {
    /// A frame of `len` rows without any view
    pub fn with_len(len: usize) -> Self {
        Frame {
            len,
            views: Vec::new(),
            groups: vec![None; len],
            partitions: vec![None; len],
            window_results: vec![RowCache::new(); len],
            group_keys: vec![RowCache::new(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn views(&self) -> &[(String, TableView)] {
        &self.views
    }

    pub fn view(&self, alias: &str) -> Option<&TableView> {
        self.views
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, view)| view)
    }

    /// Appends a view that is already aligned with this frame
    pub(crate) fn push_view(&mut self, alias: String, view: TableView) {
        debug_assert_eq!(view.len(), self.len);
        self.views.push((alias, view));
    }

    /// New frame holding rows `indices` of every view and channel
    pub fn take(&self, indices: &[usize]) -> Frame {
        Frame {
            len: indices.len(),
            views: self
                .views
                .iter()
                .map(|(alias, view)| (alias.clone(), view.take(indices)))
                .collect(),
            groups: pick(&self.groups, indices),
            partitions: pick(&self.partitions, indices),
            window_results: pick(&self.window_results, indices),
            group_keys: pick(&self.group_keys, indices),
        }
    }

    /// Same views with no rows
    pub fn empty_like(&self) -> Frame {
        self.take(&[])
    }

    /// One row in which every view holds an all-Null row
    pub(crate) fn null_extended(&self) -> Frame {
        let mut frame = Frame::with_len(1);
        for (alias, view) in &self.views {
            frame.push_view(
                alias.clone(),
                TableView::from_shared(vec![view.null_row()], view.fields.clone()),
            );
        }
        frame
    }
}

/// Mutable state of a single statement
pub struct ExecutionContext<'a> {
    functions: &'a FunctionRegistry,
    pub(crate) frame: Frame,
    has_source: bool,
    direct_fields: HashMap<String, String>,
    ambiguous_fields: HashMap<String, BTreeSet<String>>,
    pub(crate) memo: Vec<RowCache>,
    /// A plain column was evaluated outside an aggregate
    pub(crate) saw_plain_column: bool,
    /// An aggregate collapsed the input into one implicit group
    pub(crate) aggregate_bootstrapped: bool,
    /// Some aggregate call was evaluated against a group
    pub(crate) aggregated: bool,
    /// GROUP BY ran on this context
    pub(crate) grouped: bool,
    /// SELECT found no rows and substituted a Null row
    pub(crate) source_empty: bool,
    /// Synthetic group of a GROUP BY over zero rows
    pub(crate) empty_group: Option<Arc<Frame>>,
    pub(crate) patterns: PatternCache,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        ExecutionContext {
            functions,
            frame: Frame::default(),
            has_source: false,
            direct_fields: HashMap::new(),
            ambiguous_fields: HashMap::new(),
            memo: Vec::new(),
            saw_plain_column: false,
            aggregate_bootstrapped: false,
            aggregated: false,
            grouped: false,
            source_empty: false,
            empty_group: None,
            patterns: PatternCache::new(),
        }
    }

    /// Isolated context over a copy of `frame`, used for groups, window
    /// partitions and frame slices
    pub fn from_frame(functions: &'a FunctionRegistry, frame: Frame) -> Self {
        let mut context = ExecutionContext::new(functions);
        context.memo = vec![RowCache::new(); frame.len];
        context.frame = frame;
        context.has_source = true;
        context.rebuild_field_tables();
        context
    }

    pub fn functions(&self) -> &'a FunctionRegistry {
        self.functions
    }

    /// Number of logical rows
    pub fn row_size(&self) -> usize {
        self.frame.len
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Registers a FROM-clause view under `alias`. The first view fixes the
    /// row count, later views must match it.
    pub fn add_view(&mut self, alias: &str, view: TableView) -> ExecutionResult<()> {
        if self.frame.view(alias).is_some() {
            return Err(ExecutionError::DuplicateAlias(alias.to_string()));
        }
        if !self.has_source {
            self.frame = Frame::with_len(view.len());
            self.memo = vec![RowCache::new(); view.len()];
            self.has_source = true;
        } else if view.len() != self.frame.len {
            return Err(ExecutionError::RowCountMismatch {
                alias: alias.to_string(),
                expected: self.frame.len,
                actual: view.len(),
            });
        }
        self.register_fields(alias, &view.fields);
        self.frame.push_view(alias.to_string(), view);
        Ok(())
    }

    /// Makes the context a single row without views, for statements
    /// without FROM
    pub fn set_single_row(&mut self) {
        if !self.has_source {
            self.frame = Frame::with_len(1);
            self.memo = vec![RowCache::new()];
            self.has_source = true;
        }
    }

    /// Adds `alias`'s fields to the resolution tables
    pub(crate) fn register_fields(&mut self, alias: &str, fields: &[String]) {
        for field in fields {
            if let Some(owners) = self.ambiguous_fields.get_mut(field) {
                owners.insert(alias.to_string());
            } else if let Some(owner) = self.direct_fields.get(field) {
                if owner != alias {
                    let owners: BTreeSet<String> =
                        [owner.clone(), alias.to_string()].into_iter().collect();
                    self.direct_fields.remove(field);
                    self.ambiguous_fields.insert(field.clone(), owners);
                }
            } else {
                self.direct_fields.insert(field.clone(), alias.to_string());
            }
        }
    }

    /// Recomputes the resolution tables from the current views
    pub(crate) fn rebuild_field_tables(&mut self) {
        self.direct_fields.clear();
        self.ambiguous_fields.clear();
        let views: Vec<(String, Vec<String>)> = self
            .frame
            .views
            .iter()
            .map(|(alias, view)| (alias.clone(), view.fields.clone()))
            .collect();
        for (alias, fields) in views {
            self.register_fields(&alias, &fields);
        }
    }

    /// Alias owning the bare field `name`
    pub fn resolve_field(&self, name: &str) -> ExecutionResult<&str> {
        if let Some(alias) = self.direct_fields.get(name) {
            return Ok(alias.as_str());
        }
        if let Some(owners) = self.ambiguous_fields.get(name) {
            return Err(ExecutionError::AmbiguousField {
                field: name.to_string(),
                tables: owners.iter().cloned().collect::<Vec<_>>().join(", "),
            });
        }
        if self.aggregate_bootstrapped {
            return Err(ExecutionError::MixedAggregate);
        }
        Err(ExecutionError::UnknownField(name.to_string()))
    }

    /// Alias owning `name` when it resolves without ambiguity
    pub fn direct_owner(&self, name: &str) -> Option<&str> {
        self.direct_fields.get(name).map(String::as_str)
    }

    /// Whether `name` is known to the resolution tables at all
    pub fn knows_field(&self, name: &str) -> bool {
        self.direct_fields.contains_key(name) || self.ambiguous_fields.contains_key(name)
    }

    /// Replaces the frame after a cardinality change and clears the memo
    pub(crate) fn replace_frame(&mut self, frame: Frame) {
        self.memo = vec![RowCache::new(); frame.len];
        self.frame = frame;
    }

    /// Reorders or subsets rows while keeping their memo entries
    pub(crate) fn reorder(&mut self, indices: &[usize]) {
        let mut memo = std::mem::take(&mut self.memo);
        self.memo = indices
            .iter()
            .map(|&i| memo.get_mut(i).map(std::mem::take).unwrap_or_default())
            .collect();
        self.frame = self.frame.take(indices);
    }

    pub(crate) fn memo_get(&self, row: usize, label: &str) -> Option<Value> {
        self.memo
            .get(row)
            .and_then(|cache| cache.get(label))
            .or_else(|| {
                self.frame
                    .group_keys
                    .get(row)
                    .and_then(|cache| cache.get(label))
            })
            .cloned()
    }

    pub(crate) fn memo_put(&mut self, row: usize, label: &str, value: &Value) {
        if let Some(cache) = self.memo.get_mut(row) {
            cache.insert(label.to_string(), value.clone());
        }
    }

    /// Discards all statement state
    pub fn reset(&mut self) {
        *self = ExecutionContext::new(self.functions);
    }
}
