//! JSON Lines tables
//!
//! Compression is handled by the caller; see [`crate::open_table`].

use crate::{Error, Record, Result};
use custdedup_core::{Row, Table};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use tracing::warn;

/// Line-by-line JSONL reader yielding one [`Record`] per object line
///
/// Blank lines are ignored. Lines that are not valid JSON are logged,
/// counted in [`JsonlReader::skipped`] and dropped.
pub struct JsonlReader<R: Read> {
    lines: BufReader<R>,
    columns: Option<Vec<String>>,
    line_number: usize,
    skipped: usize,
}

impl<R: Read> JsonlReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader),
            columns: None,
            line_number: 0,
            skipped: 0,
        }
    }

    /// Keep only these keys of each object
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Lines consumed so far, including blank and skipped ones
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn project(&self, value: Value) -> Value {
        match (&self.columns, value) {
            (Some(keep), Value::Object(map)) => {
                Value::Object(map.into_iter().filter(|(k, _)| keep.contains(k)).collect())
            }
            (_, value) => value,
        }
    }
}

impl<R: Read> Iterator for JsonlReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = String::new();
        loop {
            buf.clear();
            match self.lines.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(Error::Io(e))),
            }

            let text = buf.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(text) {
                Ok(value) => {
                    let data = self.project(value);
                    return Some(Ok(Record::new(data, self.line_number)));
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!("Skipping malformed JSON on line {}: {}", self.line_number, e);
                }
            }
        }
    }
}

/// Collect JSONL records into a table
///
/// Columns are the union of object keys in first-seen order; keys missing
/// from a line are filled with `null`.
pub fn records_to_table<I>(records: I) -> Result<Table>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::new();

    for record in records {
        let record = record?;
        for name in record.field_names() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
        match record.data {
            Value::Object(map) => objects.push(map),
            other => {
                return Err(Error::InvalidFile(format!(
                    "line {}: expected a JSON object, found {}",
                    record.source_line, other
                )))
            }
        }
    }

    let rows: Vec<Row> = objects
        .into_iter()
        .map(|mut map| {
            columns
                .iter()
                .map(|c| map.remove(c).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows)?)
}

/// Read a JSONL table from any reader
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    records_to_table(JsonlReader::new(reader))
}

/// Write a table as one JSON object per line, in column order
pub fn write_table<W: Write>(mut writer: W, table: &Table) -> Result<()> {
    for i in 0..table.len() {
        if let Some(obj) = table.row_object(i) {
            writeln!(writer, "{}", serde_json::to_string(&obj)?)?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_object_lines() {
        let data = r#"{"email": "a@x.com", "total_orders": 1}
{"email": "b@x.com", "total_orders": 2}
"#;

        let records = JsonlReader::new(data.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data["email"], "a@x.com");
        assert_eq!(records[1].data["total_orders"], 2);
    }

    #[test]
    fn test_blank_and_malformed_lines_skipped() {
        let data = "{\"email\": \"a@x.com\"}\n\n{not json}\n{\"email\": \"b@x.com\"}\n";

        let mut reader = JsonlReader::new(data.as_bytes());
        let records = reader.by_ref().collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source_line, 4);
        assert_eq!(reader.skipped(), 1);
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn test_column_projection() {
        let data = r#"{"email": "a@x.com", "total_orders": 1, "note": "extra"}"#;

        let records = JsonlReader::new(data.as_bytes())
            .with_columns(["email", "total_orders"])
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert!(records[0].data.get("email").is_some());
        assert!(records[0].data.get("note").is_none());
    }

    #[test]
    fn test_table_from_ragged_objects() {
        let data = r#"{"customer_id": 1, "email": "a@x.com"}
{"email": "b@x.com", "total_orders": 4}"#;

        let table = read_table(data.as_bytes()).unwrap();
        assert_eq!(table.columns(), ["customer_id", "email", "total_orders"]);
        assert_eq!(table.rows()[0], vec![json!(1), json!("a@x.com"), Value::Null]);
        assert_eq!(table.rows()[1], vec![Value::Null, json!("b@x.com"), json!(4)]);
    }

    #[test]
    fn test_non_object_line_rejected() {
        let result = read_table("[1, 2]\n".as_bytes());
        assert!(matches!(result, Err(Error::InvalidFile(_))));
    }

    #[test]
    fn test_write_table_keeps_column_order() {
        let table = Table::new(
            ["total_orders", "email"],
            vec![vec![json!(2), json!("a@x.com")]],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"total_orders\":2,\"email\":\"a@x.com\"}\n"
        );
    }
}
