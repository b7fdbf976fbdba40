//! Table-wide properties of deduplication over generated inputs

use custdedup_core::{deduplicate, Deduplicator, Table};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

fn recase(variant: u64, s: &str) -> String {
    match variant {
        0 => s.to_string(),
        1 => s.to_uppercase(),
        2 => format!(" {} ", s),
        _ => {
            let mut c = s.chars();
            match c.next() {
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
                None => String::new(),
            }
        }
    }
}

/// Small deterministic LCG so the generated tables are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn generate(seed: u64, rows: usize, identities: u64) -> Table {
    let mut rng = Lcg(seed);
    let data = (0..rows)
        .map(|i| {
            let base = format!("person{}@shop.example", rng.next() % identities);
            let email = recase(rng.next() % 4, &base);
            vec![
                json!(i),
                json!(email),
                json!(rng.next() % 6),
                json!(format!("payload-{}", i)),
            ]
        })
        .collect();
    Table::new(["customer_id", "email", "total_orders", "note"], data).unwrap()
}

fn key(v: &Value) -> String {
    v.as_str().unwrap().trim().to_lowercase()
}

#[test]
fn output_has_unique_identities() {
    for seed in 0..20 {
        let table = generate(seed, 60, 15);
        let out = deduplicate(&table).unwrap();
        let mut seen = HashSet::new();
        for email in out.column("email").unwrap() {
            assert!(seen.insert(key(email)), "seed {} repeated {}", seed, email);
        }
    }
}

#[test]
fn survivors_carry_group_maximum() {
    for seed in 0..20 {
        let table = generate(seed, 80, 10);
        let mut best: HashMap<String, u64> = HashMap::new();
        for row in table.rows() {
            let orders = row[2].as_u64().unwrap();
            let entry = best.entry(key(&row[1])).or_insert(0);
            *entry = (*entry).max(orders);
        }

        let out = deduplicate(&table).unwrap();
        assert_eq!(out.len(), best.len());
        for row in out.rows() {
            assert_eq!(row[2].as_u64().unwrap(), best[&key(&row[1])]);
        }
    }
}

#[test]
fn columns_and_input_unchanged_and_idempotent() {
    for seed in 0..10 {
        let table = generate(seed, 40, 8);
        let snapshot = table.clone();
        let once = deduplicate(&table).unwrap();

        assert_eq!(table, snapshot);
        assert_eq!(once.columns(), table.columns());
        assert_eq!(deduplicate(&once).unwrap(), once);
    }
}

#[test]
fn removed_rows_account_for_every_input_row() {
    let table = generate(7, 100, 12);
    let report = Deduplicator::default().deduplicate(&table).unwrap();
    assert_eq!(report.table.len() + report.removed.len(), table.len());

    let kept: HashSet<u64> = report
        .table
        .column("customer_id")
        .unwrap()
        .map(|v| v.as_u64().unwrap())
        .collect();
    for removed in &report.removed {
        let survivor_id = table.get(removed.duplicate_of, "customer_id").unwrap();
        assert!(kept.contains(&survivor_id.as_u64().unwrap()));
        assert_eq!(key(table.get(removed.row, "email").unwrap()), removed.key);
    }
}
