use std::collections::HashSet;

use ddlseed_core::{Table, Value};

/// Accepted keys of one uniqueness group (a unique constraint or the
/// primary key) within a single table fill.
///
/// NULLs are distinct as in Postgres: a key with a NULL column never
/// collides, even with another all-NULL key.
#[derive(Debug)]
pub struct UniqueSet {
    columns: Vec<usize>,
    seen: HashSet<Vec<String>>,
}

impl UniqueSet {
    pub fn new(columns: Vec<usize>) -> Self {
        Self {
            columns,
            seen: HashSet::new(),
        }
    }

    /// One set per uniqueness group of `table`, keyed by column position.
    pub fn for_table(table: &Table) -> Vec<Self> {
        table
            .uniqueness_groups()
            .iter()
            .map(|group| {
                Self::new(
                    group
                        .iter()
                        .filter_map(|column| table.column_index(column))
                        .collect(),
                )
            })
            .filter(|set| !set.columns.is_empty())
            .collect()
    }

    /// `None` when any column of the group is NULL: such rows never collide.
    fn key_for(&self, row: &[Value]) -> Option<Vec<String>> {
        self.columns
            .iter()
            .map(|&idx| row.get(idx).and_then(Value::key))
            .collect()
    }

    pub fn collides(&self, row: &[Value]) -> bool {
        self.key_for(row).is_some_and(|key| self.seen.contains(&key))
    }

    fn insert(&mut self, row: &[Value]) {
        if let Some(key) = self.key_for(row) {
            self.seen.insert(key);
        }
    }
}

/// Accept `row` if it collides with no group, recording its keys.
pub fn admit(sets: &mut [UniqueSet], row: &[Value]) -> bool {
    if sets.iter().any(|set| set.collides(row)) {
        return false;
    }
    for set in sets.iter_mut() {
        set.insert(row);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Value {
        Value::Text(value.to_string())
    }

    #[test]
    fn composite_groups_compare_every_column() {
        let mut sets = vec![UniqueSet::new(vec![0, 1])];
        assert!(admit(&mut sets, &[Value::Int(1), text("a")]));
        assert!(admit(&mut sets, &[Value::Int(1), text("b")]));
        assert!(admit(&mut sets, &[Value::Int(2), text("a")]));
        assert!(!admit(&mut sets, &[Value::Int(1), text("a")]));
    }

    #[test]
    fn null_never_collides() {
        let mut sets = vec![UniqueSet::new(vec![0])];
        assert!(admit(&mut sets, &[Value::Null]));
        assert!(admit(&mut sets, &[Value::Null]));
    }

    #[test]
    fn rejected_rows_leave_no_trace() {
        let mut sets = vec![UniqueSet::new(vec![0]), UniqueSet::new(vec![1])];
        assert!(admit(&mut sets, &[Value::Int(1), Value::Int(1)]));
        assert!(!admit(&mut sets, &[Value::Int(2), Value::Int(1)]));
        assert!(admit(&mut sets, &[Value::Int(2), Value::Int(2)]));
    }
}
