//! Date column parsing and cleaning

use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use custdedup_core::Table;
use serde_json::Value;
use tracing::{debug, info};

/// Format of the dates in the shipped extracts
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Output of [`parse_date_column`]
#[derive(Debug, Clone)]
pub struct DateColumnReport {
    /// Copy of the input with the column rewritten
    pub table: Table,
    /// Cells that parsed as dates
    pub parsed: usize,
    /// Non-null cells that failed to parse and were set to null
    pub cleared: usize,
}

/// Reject strftime patterns chrono cannot interpret
pub fn check_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

/// Parse a single date string
pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).ok()
}

/// Parse every cell of `column` with `format`
///
/// Valid dates are rewritten in ISO `YYYY-MM-DD` form, anything else that
/// is not already null becomes null. The input table is left untouched.
pub fn parse_date_column(table: &Table, column: &str, format: &str) -> Result<DateColumnReport> {
    check_format(format)?;
    let index = table.schema().require(column).map_err(Error::Core)?;

    let mut parsed = 0;
    let mut cleared = 0;
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut row = row.clone();
            let cell = &row[index];
            if !cell.is_null() {
                match cell.as_str().and_then(|s| parse_date(s, format)) {
                    Some(date) => {
                        parsed += 1;
                        row[index] = Value::String(date.format("%Y-%m-%d").to_string());
                    }
                    None => {
                        debug!("Clearing unparseable `{}` value {}", column, cell);
                        cleared += 1;
                        row[index] = Value::Null;
                    }
                }
            }
            row
        })
        .collect();

    if cleared > 0 {
        info!("Cleared {} invalid `{}` values", cleared, column);
    }

    Ok(DateColumnReport {
        table: Table::with_schema(table.schema().clone(), rows)?,
        parsed,
        cleared,
    })
}
