//! Core table model and identity deduplication
//!
//! This crate provides the in-memory table representation and the pure
//! transformations over it: keeping one row per customer identity and
//! replicating a table into disjoint ID ranges.

pub mod error;
pub mod table;
pub mod identity;
pub mod dedup;
pub mod replicate;

pub use dedup::{deduplicate, DedupConfig, DedupReport, DedupStats, Deduplicator, RemovedRow};
pub use error::{Error, Result, SchemaError};
pub use identity::KeyNormalization;
pub use replicate::{replicate, ReplicationPlan};
pub use table::{Row, Schema, Table};
