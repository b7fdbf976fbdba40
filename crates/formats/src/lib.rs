//! Table readers and writers
//!
//! This crate loads CSV and JSON Lines files (optionally gzip-compressed)
//! into [`custdedup_core::Table`] values and writes them back out. It also
//! holds the date-column cleaning used when loading customer and order
//! extracts.

pub mod error;
pub mod csv_table;
pub mod dataset;
pub mod dates;
pub mod jsonl;
pub mod reader;
pub mod record;

pub use dataset::DataDir;
pub use error::{Error, Result};
pub use reader::{open_table, save_table, TableFormat};
pub use record::Record;
