//! In-memory tabular data with a fixed, ordered column set
//!
//! Cells are dynamically typed `serde_json::Value`s so any CSV or JSON
//! source can be represented without a schema declaration. Rows are
//! checked against the column count when the table is built.

use crate::error::SchemaError;
use crate::Result;
use ahash::AHashMap;
use serde_json::Value;
use std::sync::Arc;

/// A single row of cells, positionally aligned with a [`Schema`]
pub type Row = Vec<Value>;

/// Ordered, unique column names
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Schema {
    /// Build a schema, rejecting repeated column names
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = AHashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    column: name.clone(),
                }
                .into());
            }
        }
        Ok(Self { columns, index })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Position of a column, or a `MissingColumn` error naming it
    pub fn require(&self, column: &str) -> Result<usize> {
        self.index_of(column).ok_or_else(|| {
            SchemaError::MissingColumn {
                column: column.to_string(),
            }
            .into()
        })
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

/// An ordered sequence of rows sharing one schema
///
/// Operations in this crate take `&Table` and build a new table, so the
/// input is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Arc<Schema>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from column names and rows
    pub fn new<I, S>(columns: I, rows: Vec<Row>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_schema(Arc::new(Schema::new(columns)?), rows)
    }

    /// Build a table over an existing schema
    pub fn with_schema(schema: Arc<Schema>, rows: Vec<Row>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(SchemaError::RowWidth {
                    row: i,
                    expected: schema.len(),
                    actual: row.len(),
                }
                .into());
            }
        }
        Ok(Self { schema, rows })
    }

    /// An empty table with the same columns as `self`
    pub fn empty_like(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` in the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.schema.index_of(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Iterate one column top to bottom
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let col = self.schema.require(column)?;
        Ok(self.rows.iter().map(move |r| &r[col]))
    }

    /// Render row `i` as a JSON object in column order
    pub fn row_object(&self, i: usize) -> Option<Value> {
        let row = self.rows.get(i)?;
        let map: serde_json::Map<String, Value> = self
            .columns()
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();
        Some(Value::Object(map))
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn sample() -> Table {
        Table::new(
            ["customer_id", "email"],
            vec![
                vec![json!(1), json!("a@x.com")],
                vec![json!(2), json!("b@x.com")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_accessors() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["customer_id", "email"]);
        assert_eq!(table.get(1, "email"), Some(&json!("b@x.com")));
        assert_eq!(table.get(0, "missing"), None);

        let ids: Vec<_> = table.column("customer_id").unwrap().cloned().collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Table::new(["email", "email"], vec![]);
        assert!(matches!(
            result,
            Err(Error::Schema(SchemaError::DuplicateColumn { .. }))
        ));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = Table::new(["a", "b"], vec![vec![json!(1)]]);
        match result {
            Err(Error::Schema(SchemaError::RowWidth { row, expected, actual })) => {
                assert_eq!((row, expected, actual), (0, 2, 1));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_named() {
        let table = sample();
        let err = table.column("total_orders").err().unwrap();
        assert!(err.to_string().contains("total_orders"));
    }

    #[test]
    fn test_row_object_keeps_column_order() {
        let table = sample();
        let obj = table.row_object(0).unwrap();
        let keys: Vec<_> = obj.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["customer_id", "email"]);
    }

    #[test]
    fn test_empty_like_keeps_schema() {
        let table = sample();
        let empty = table.empty_like();
        assert!(empty.is_empty());
        assert_eq!(empty.columns(), table.columns());
    }
}
