//! Deterministic scale-out of a table
//!
//! Produces `factor` copies of every row. Integer ID columns are shifted
//! by `(copy - 1) * stride` so each copy occupies its own ID range, and
//! string ID columns get a `_{copy}` suffix. Tables replicated with
//! matching strides still join one-to-one across copies.

use crate::error::SchemaError;
use crate::table::{Row, Table};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Shift an integer column by a fixed stride per copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdOffset {
    pub column: String,
    pub stride: u64,
}

/// How to replicate a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationPlan {
    pub factor: usize,
    #[serde(default)]
    pub offsets: Vec<IdOffset>,
    #[serde(default)]
    pub suffixed: Vec<String>,
}

impl ReplicationPlan {
    pub fn new(factor: usize) -> Self {
        Self {
            factor,
            offsets: Vec::new(),
            suffixed: Vec::new(),
        }
    }

    pub fn offset(mut self, column: impl Into<String>, stride: u64) -> Self {
        self.offsets.push(IdOffset {
            column: column.into(),
            stride,
        });
        self
    }

    pub fn suffix(mut self, column: impl Into<String>) -> Self {
        self.suffixed.push(column.into());
        self
    }

    /// Customers keyed by `customer_id` below 20 000
    pub fn customers(factor: usize) -> Self {
        Self::new(factor).offset("customer_id", CUSTOMER_ID_STRIDE)
    }

    /// Orders keyed by `order_id`, referencing `customer_id`
    pub fn orders(factor: usize) -> Self {
        Self::new(factor)
            .offset("order_id", ORDER_ID_STRIDE)
            .offset("customer_id", CUSTOMER_ID_STRIDE)
    }

    /// Order items with string IDs, referencing `order_id`
    pub fn order_items(factor: usize) -> Self {
        Self::new(factor)
            .suffix("order_item_id")
            .offset("order_id", ORDER_ID_STRIDE)
    }
}

pub const CUSTOMER_ID_STRIDE: u64 = 20_000;
pub const ORDER_ID_STRIDE: u64 = 200_000;

struct ResolvedOffset {
    index: usize,
    stride: u64,
}

/// Replicate `table` according to `plan`
///
/// Output is copy-major: every row of copy 1 in input order, then copy 2,
/// and so on. Offset columns must hold integers in `0..stride`, otherwise
/// copies would overlap and the call fails.
pub fn replicate(table: &Table, plan: &ReplicationPlan) -> Result<Table> {
    if plan.factor == 0 {
        return Err(Error::InvalidConfig(
            "replication factor must be at least 1".to_string(),
        ));
    }

    let schema = table.schema();
    let mut offsets = Vec::with_capacity(plan.offsets.len());
    for offset in &plan.offsets {
        if offset.stride == 0 {
            return Err(Error::InvalidConfig(format!(
                "stride for `{}` must be positive",
                offset.column
            )));
        }
        // Largest ID the last copy can produce must still fit in a u64
        let top = (plan.factor as u64 - 1)
            .checked_mul(offset.stride)
            .and_then(|base| base.checked_add(offset.stride - 1));
        if top.is_none() {
            return Err(Error::InvalidConfig(format!(
                "`{}` stride {} x{} copies overflows the ID range",
                offset.column, offset.stride, plan.factor
            )));
        }
        let index = schema.require(&offset.column)?;
        offsets.push(ResolvedOffset {
            index,
            stride: offset.stride,
        });
    }
    let suffixed = plan
        .suffixed
        .iter()
        .map(|c| schema.require(c))
        .collect::<Result<Vec<_>>>()?;

    for (offset, spec) in offsets.iter().zip(&plan.offsets) {
        for (row_idx, row) in table.rows().iter().enumerate() {
            let cell = &row[offset.index];
            if cell.is_null() {
                continue;
            }
            match cell.as_u64() {
                Some(id) if id < offset.stride => {}
                Some(id) => {
                    return Err(Error::InvalidConfig(format!(
                        "`{}` value {} at row {} does not fit below stride {}",
                        spec.column, id, row_idx, offset.stride
                    )))
                }
                None => {
                    return Err(SchemaError::InvalidId {
                        column: spec.column.clone(),
                        row: row_idx,
                        value: cell.to_string(),
                    }
                    .into())
                }
            }
        }
    }

    if plan.factor == 1 {
        return Ok(table.clone());
    }

    let capacity = table.len().checked_mul(plan.factor).ok_or_else(|| {
        Error::InvalidConfig(format!(
            "{} rows x{} copies overflows the table size",
            table.len(),
            plan.factor
        ))
    })?;
    let mut rows: Vec<Row> = Vec::with_capacity(capacity);
    for copy in 1..=plan.factor as u64 {
        for row in table.rows() {
            let mut out = row.clone();
            for offset in &offsets {
                if let Some(id) = out[offset.index].as_u64() {
                    out[offset.index] = Value::from(id + (copy - 1) * offset.stride);
                }
            }
            for &index in &suffixed {
                out[index] = match &out[index] {
                    Value::Null => Value::Null,
                    Value::String(s) => Value::String(format!("{}_{}", s, copy)),
                    other => Value::String(format!("{}_{}", other, copy)),
                };
            }
            rows.push(out);
        }
    }

    info!(
        "Replicated {} rows x{} into {} rows",
        table.len(),
        plan.factor,
        rows.len()
    );

    Table::with_schema(schema.clone(), rows)
}
