use super::value::Value;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A row maps field names to values
pub type Row = HashMap<String, Value>;

/// An ordered sequence of rows that all carry the same declared field set.
///
/// Rows are shared through `Arc` so that reindexing a view (filtering,
/// sorting, grouping) only copies pointers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub rows: Vec<Arc<Row>>,
    pub fields: Vec<String>,
}

impl TableView {
    /// Creates a view from owned rows. When `fields` is omitted the field set
    /// is taken from the keys of the first row.
    pub fn new(rows: Vec<Row>, fields: Option<Vec<String>>) -> Self {
        let fields = fields.unwrap_or_else(|| {
            let mut keys: Vec<String> = rows
                .first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default();
            keys.sort();
            keys
        });
        TableView {
            rows: rows.into_iter().map(Arc::new).collect(),
            fields,
        }
    }

    /// Creates a view from rows that are already shared
    pub fn from_shared(rows: Vec<Arc<Row>>, fields: Vec<String>) -> Self {
        TableView { rows, fields }
    }

    /// An empty view with the given field set
    pub fn empty(fields: Vec<String>) -> Self {
        TableView {
            rows: Vec::new(),
            fields,
        }
    }

    /// Parses a JSON array of objects into a view
    pub fn from_json(text: &str) -> Result<Self> {
        let rows: Vec<Row> =
            serde_json::from_str(text).context("Expected a JSON array of objects")?;
        let view = TableView::new(rows, None);
        view.validate()?;
        Ok(view)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Value of `field` in row `index`. Missing cells read as Null.
    pub fn value(&self, index: usize, field: &str) -> Value {
        self.rows
            .get(index)
            .and_then(|row| row.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// New view holding the rows at `indices`, in that order
    pub fn take(&self, indices: &[usize]) -> TableView {
        TableView {
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
            fields: self.fields.clone(),
        }
    }

    /// A row carrying every declared field set to Null
    pub fn null_row(&self) -> Arc<Row> {
        Arc::new(
            self.fields
                .iter()
                .map(|f| (f.clone(), Value::Null))
                .collect(),
        )
    }

    /// Checks that every row carries exactly the declared field set
    pub fn validate(&self) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            for field in row.keys() {
                if !self.has_field(field) {
                    bail!("Row {} has undeclared field '{}'", i, field);
                }
            }
        }
        Ok(())
    }
}
