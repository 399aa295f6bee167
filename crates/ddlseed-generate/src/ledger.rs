use std::collections::{BTreeMap, HashMap};

use rand::{Rng, RngCore};

use ddlseed_core::{TableId, Value};

/// Committed rows of every filled table, stored per column, from which
/// descendant tables sample their foreign-key values.
#[derive(Debug, Default)]
pub struct Ledger {
    tables: HashMap<TableId, CommittedTable>,
}

#[derive(Debug, Default)]
struct CommittedTable {
    rows: usize,
    columns: BTreeMap<String, Vec<Value>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rows of `table` once its transaction has committed.
    pub fn commit(&mut self, table: TableId, columns: &[String], rows: &[Vec<Value>]) {
        let mut committed = CommittedTable {
            rows: rows.len(),
            columns: BTreeMap::new(),
        };
        for (idx, column) in columns.iter().enumerate() {
            let values = rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(Value::Null))
                .collect();
            committed.columns.insert(column.clone(), values);
        }
        self.tables.insert(table, committed);
    }

    pub fn row_count(&self, table: TableId) -> usize {
        self.tables.get(&table).map_or(0, |committed| committed.rows)
    }

    /// Uniformly random committed row index; `None` when the table has no rows.
    pub fn sample_row(&self, table: TableId, rng: &mut dyn RngCore) -> Option<usize> {
        match self.row_count(table) {
            0 => None,
            rows => Some(rng.random_range(0..rows)),
        }
    }

    pub fn value(&self, table: TableId, column: &str, row: usize) -> Option<&Value> {
        self.tables.get(&table)?.columns.get(column)?.get(row)
    }
}
