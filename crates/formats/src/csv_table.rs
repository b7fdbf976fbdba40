//! CSV table reader and writer
//!
//! The header row defines the column set. Cell types are inferred one
//! cell at a time: empty and NA markers become `null`, then integers,
//! floats and booleans are recognized, and everything else stays a
//! string.

use crate::Result;
use custdedup_core::{Row, Table};
use serde_json::{Number, Value};
use std::io::{Read, Write};
use tracing::debug;

/// Options for reading and writing CSV tables
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Infer numbers and booleans (otherwise every non-empty cell is a string)
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_types: true,
        }
    }
}

const NA_MARKERS: [&str; 6] = ["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Infer a typed cell from raw CSV text
pub fn infer_cell(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() || NA_MARKERS.contains(&raw) {
        return Value::Null;
    }

    // Keep zero-padded codes such as phone numbers or postcodes intact
    let zero_padded = raw.len() > 1 && raw.starts_with('0') && !raw.starts_with("0.");
    if !zero_padded {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if let Some(n) = Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }

    match raw {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Render a cell back to CSV text
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a CSV table from any reader
pub fn read_table<R: Read>(reader: R, options: &CsvOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Row> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|raw| {
                if options.infer_types {
                    infer_cell(raw)
                } else if raw.is_empty() {
                    Value::Null
                } else {
                    Value::String(raw.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    debug!("Read {} CSV rows with {} columns", rows.len(), headers.len());
    Ok(Table::new(headers, rows)?)
}

/// Write a table as CSV with a header row
pub fn write_table<W: Write>(writer: W, table: &Table, options: &CsvOptions) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(render_cell))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CUSTOMERS: &str = "\
customer_id,name,email,total_orders,total_spent,is_subscribed
1001,Rahul Kumar,rahul.kumar@email.com,5,2500.0,True
1002, Priya Sharma ,priya.sharma@email.com,3,,false
";

    #[test]
    fn test_read_infers_types() {
        let table = read_table(CUSTOMERS.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.columns(),
            ["customer_id", "name", "email", "total_orders", "total_spent", "is_subscribed"]
        );
        assert_eq!(
            table.rows()[0],
            vec![
                json!(1001),
                json!("Rahul Kumar"),
                json!("rahul.kumar@email.com"),
                json!(5),
                json!(2500.0),
                json!(true),
            ]
        );
        assert_eq!(table.get(1, "name"), Some(&json!("Priya Sharma")));
        assert_eq!(table.get(1, "total_spent"), Some(&Value::Null));
    }

    #[test]
    fn test_read_without_inference() {
        let options = CsvOptions {
            infer_types: false,
            ..Default::default()
        };
        let table = read_table(CUSTOMERS.as_bytes(), &options).unwrap();
        assert_eq!(table.get(0, "total_orders"), Some(&json!("5")));
        assert_eq!(table.get(1, "total_spent"), Some(&Value::Null));
    }

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell("42"), json!(42));
        assert_eq!(infer_cell("-3"), json!(-3));
        assert_eq!(infer_cell("0"), json!(0));
        assert_eq!(infer_cell("0.5"), json!(0.5));
        assert_eq!(infer_cell("0123456789"), json!("0123456789"));
        assert_eq!(infer_cell("NaN"), Value::Null);
        assert_eq!(infer_cell("  "), Value::Null);
        assert_eq!(infer_cell("FALSE"), json!(false));
        assert_eq!(infer_cell("2024-01-15"), json!("2024-01-15"));
    }

    #[test]
    fn test_ragged_rows_fail() {
        let data = "a,b\n1,2\n3\n";
        assert!(read_table(data.as_bytes(), &CsvOptions::default()).is_err());
    }

    #[test]
    fn test_write_then_read_keeps_table() {
        let table = read_table(CUSTOMERS.as_bytes(), &CsvOptions::default()).unwrap();

        let mut buf = Vec::new();
        write_table(&mut buf, &table, &CsvOptions::default()).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("customer_id,name,email"));

        let reread = read_table(buf.as_slice(), &CsvOptions::default()).unwrap();
        assert_eq!(reread, table);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let options = CsvOptions {
            delimiter: b';',
            ..Default::default()
        };
        let table = read_table("email;total_orders\nx@y.com;2\n".as_bytes(), &options).unwrap();
        assert_eq!(table.get(0, "total_orders"), Some(&json!(2)));
    }
}
