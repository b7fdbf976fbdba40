//! Loaders for the standard customer, order and product extracts

use crate::dates::{self, DEFAULT_DATE_FORMAT};
use crate::{open_table, Error, Result};
use custdedup_core::Table;
use std::path::{Path, PathBuf};
use tracing::info;

/// A directory holding `customers.csv`, `orders.csv`, `products.csv`, ...
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `<name>.csv` under the root, failing if it does not exist
    pub fn require(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(format!("{}.csv", name));
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::NotFound(path))
        }
    }

    /// Load `<name>.csv` as-is
    pub fn load_table(&self, name: &str) -> Result<Table> {
        open_table(self.require(name)?)
    }

    /// Load customers, nulling `signup_date` values that are not valid dates
    pub fn load_customers(&self) -> Result<Table> {
        let table = self.load_table("customers")?;
        if table.schema().index_of("signup_date").is_none() {
            return Ok(table);
        }
        let report = dates::parse_date_column(&table, "signup_date", DEFAULT_DATE_FORMAT)?;
        info!(
            "Loaded {} customers ({} invalid signup dates cleared)",
            report.table.len(),
            report.cleared
        );
        Ok(report.table)
    }

    /// Load orders with `order_date` parsed as `YYYY-MM-DD`
    pub fn load_orders(&self) -> Result<Table> {
        let table = self.load_table("orders")?;
        let report = dates::parse_date_column(&table, "order_date", DEFAULT_DATE_FORMAT)?;
        info!(
            "Loaded {} orders ({} unparseable order dates)",
            report.table.len(),
            report.cleared
        );
        Ok(report.table)
    }

    pub fn load_products(&self) -> Result<Table> {
        self.load_table("products")
    }
}
