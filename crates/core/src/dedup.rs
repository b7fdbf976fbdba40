//! Identity deduplication for customer tables
//!
//! Rows are grouped by a normalized identity key (the email by default).
//! Each group keeps exactly one row: the one with the highest tie-break
//! count, or the first-seen of several equal maxima. Survivors are
//! emitted in the order their group first appeared in the input.

use crate::identity::{IdentityColumns, IdentityRecord, KeyNormalization};
use crate::table::Table;
use crate::Result;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Statistics for a deduplication run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Total number of rows seen
    pub total_seen: usize,
    /// Number of rows dropped as duplicates
    pub duplicates_found: usize,
    /// Number of rows kept
    pub unique_count: usize,
    /// Rows with a null or blank key, kept as their own identity
    pub rows_without_key: usize,
}

impl DedupStats {
    /// Get the deduplication rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (self.duplicates_found as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Which columns identify and rank a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Column holding the identity key
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Column holding the tie-break count
    #[serde(default = "default_tie_break_column")]
    pub tie_break_column: String,
    #[serde(default)]
    pub normalization: KeyNormalization,
}

fn default_key_column() -> String {
    "email".to_string()
}

fn default_tie_break_column() -> String {
    "total_orders".to_string()
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            key_column: default_key_column(),
            tie_break_column: default_tie_break_column(),
            normalization: KeyNormalization::default(),
        }
    }
}

/// An input row that lost to another row with the same key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedRow {
    /// Position of the dropped row in the input
    pub row: usize,
    /// Position of the surviving row in the input
    pub duplicate_of: usize,
    /// The shared normalized key
    pub key: String,
}

/// Result of a deduplication run
#[derive(Debug, Clone)]
pub struct DedupReport {
    pub table: Table,
    pub removed: Vec<RemovedRow>,
    pub stats: DedupStats,
}

/// Current winner of one identity group
struct Slot {
    winner: IdentityRecord,
    members: Vec<usize>,
}

/// Keeps one row per identity key
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Deduplicate `table`, returning a new table and a report
    ///
    /// Fails before producing any output if the key or tie-break column is
    /// missing, or if any tie-break cell is not a non-negative integer.
    pub fn deduplicate(&self, table: &Table) -> Result<DedupReport> {
        let columns = IdentityColumns::resolve(
            table.schema(),
            &self.config.key_column,
            &self.config.tie_break_column,
        )?;

        debug!(
            "Deduplicating {} rows on `{}` (tie-break `{}`, {:?})",
            table.len(),
            self.config.key_column,
            self.config.tie_break_column,
            self.config.normalization
        );

        let mut stats = DedupStats {
            total_seen: table.len(),
            ..Default::default()
        };
        let mut slots: Vec<Slot> = Vec::new();
        let mut groups: AHashMap<String, usize> = AHashMap::new();

        for (position, row) in table.rows().iter().enumerate() {
            let record =
                IdentityRecord::from_row(&columns, self.config.normalization, row, position)?;

            let existing = record.key.as_ref().and_then(|k| groups.get(k).copied());
            match existing {
                Some(slot_idx) => {
                    let slot = &mut slots[slot_idx];
                    slot.members.push(position);
                    if record.total_orders > slot.winner.total_orders {
                        slot.winner = record;
                    }
                }
                None => {
                    match record.key {
                        Some(ref key) => {
                            groups.insert(key.clone(), slots.len());
                        }
                        None => stats.rows_without_key += 1,
                    }
                    slots.push(Slot {
                        winner: record,
                        members: vec![position],
                    });
                }
            }
        }

        let mut rows = Vec::with_capacity(slots.len());
        let mut removed = Vec::new();
        for slot in slots {
            let winner = slot.winner.position;
            rows.push(table.rows()[winner].clone());
            if let Some(key) = slot.winner.key {
                removed.extend(
                    slot.members
                        .into_iter()
                        .filter(|&m| m != winner)
                        .map(|row| RemovedRow {
                            row,
                            duplicate_of: winner,
                            key: key.clone(),
                        }),
                );
            }
        }
        removed.sort_by_key(|r| r.row);

        stats.unique_count = rows.len();
        stats.duplicates_found = removed.len();

        info!(
            "Kept {} of {} rows ({} duplicates, {:.1}%)",
            stats.unique_count,
            stats.total_seen,
            stats.duplicates_found,
            stats.dedup_rate()
        );

        Ok(DedupReport {
            table: Table::with_schema(table.schema().clone(), rows)?,
            removed,
            stats,
        })
    }
}

/// Deduplicate on `email` with `total_orders` as the tie-break
pub fn deduplicate(table: &Table) -> Result<Table> {
    Deduplicator::default()
        .deduplicate(table)
        .map(|report| report.table)
}
