//! Typed identity view over a table row
//!
//! Deduplication only needs two fields from each row: the identity key
//! and the tie-break count. [`IdentityRecord`] extracts both once and
//! fails with a [`SchemaError`] instead of defaulting malformed values.

use crate::error::SchemaError;
use crate::table::{Row, Schema};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the identity key is normalized before comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNormalization {
    /// Compare the raw string
    Exact,
    /// Lowercase only
    Lowercase,
    /// Trim surrounding whitespace, then lowercase
    #[default]
    TrimLowercase,
}

impl KeyNormalization {
    /// Normalize a key cell
    ///
    /// Returns `None` for null, non-string or blank keys; those rows never
    /// merge with anything.
    pub fn normalize(&self, value: &Value) -> Option<String> {
        let raw = value.as_str()?;
        let key = match self {
            KeyNormalization::Exact => raw.to_string(),
            KeyNormalization::Lowercase => raw.to_lowercase(),
            KeyNormalization::TrimLowercase => raw.trim().to_lowercase(),
        };
        if key.trim().is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

/// Column positions of the identity key and tie-break
#[derive(Debug, Clone)]
pub struct IdentityColumns {
    pub key: usize,
    pub tie_break: usize,
    tie_break_name: String,
}

impl IdentityColumns {
    /// Resolve both columns, failing with `MissingColumn` if either is absent
    pub fn resolve(schema: &Schema, key: &str, tie_break: &str) -> Result<Self> {
        Ok(Self {
            key: schema.require(key)?,
            tie_break: schema.require(tie_break)?,
            tie_break_name: tie_break.to_string(),
        })
    }
}

/// The fields of one row that decide its identity and rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Row position in the input table
    pub position: usize,
    /// Normalized identity key, `None` when the row has no usable key
    pub key: Option<String>,
    /// Tie-break count
    pub total_orders: u64,
}

impl IdentityRecord {
    pub fn from_row(
        columns: &IdentityColumns,
        normalization: KeyNormalization,
        row: &Row,
        position: usize,
    ) -> Result<Self> {
        let total_orders = parse_count(&row[columns.tie_break]).ok_or_else(|| {
            SchemaError::InvalidTieBreak {
                column: columns.tie_break_name.clone(),
                row: position,
                value: row[columns.tie_break].to_string(),
            }
        })?;

        Ok(Self {
            position,
            key: normalization.normalize(&row[columns.key]),
            total_orders,
        })
    }
}

/// Read a non-negative integer; integral floats like `6.0` are accepted
fn parse_count(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(v) = n.as_u64() {
        return Some(v);
    }
    let f = n.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
