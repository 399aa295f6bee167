use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use ddlseed_core::{SchemaGraph, Table, TableId, Value, ValueContext, resolve_fill_order};

use crate::errors::GenerationError;
use crate::ledger::Ledger;
use crate::model::{GenerateOptions, GenerationReport, TableReport};
use crate::sink::{InsertBatch, RowSink};
use crate::unique::{self, UniqueSet};

/// Fills every table of a schema graph in foreign-key order.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

/// Accepted rows of one table and the retries spent on them.
#[derive(Debug)]
struct TableRows {
    rows: Vec<Vec<Value>>,
    retries: u64,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Resolve the fill order, then fill every table through `sink`.
    pub async fn run<S>(
        &self,
        graph: &SchemaGraph,
        sink: &mut S,
    ) -> Result<GenerationReport, GenerationError>
    where
        S: RowSink + ?Sized,
    {
        let order = resolve_fill_order(graph)?;
        self.fill(graph, &order, sink).await
    }

    /// Fill tables in the given order. Any failure aborts the remaining
    /// tables; tables already persisted stay committed.
    pub async fn fill<S>(
        &self,
        graph: &SchemaGraph,
        order: &[TableId],
        sink: &mut S,
    ) -> Result<GenerationReport, GenerationError>
    where
        S: RowSink + ?Sized,
    {
        let start = Instant::now();
        let seed = self.options.seed.unwrap_or_else(rand::random);
        let now = self.options.reference_time.unwrap_or_else(Utc::now);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ledger = Ledger::new();
        let mut report = GenerationReport::new(seed);

        info!(
            seed,
            tables = order.len(),
            sink = sink.name(),
            "generation started"
        );

        for &id in order {
            let table = graph.table(id);
            let rows_requested = table.row_count(self.options.default_rows);
            let table_start = Instant::now();
            info!(
                schema = %table.schema,
                table = %table.name,
                rows = rows_requested,
                "generating table"
            );

            let generated = match generate_table(
                table,
                rows_requested,
                &ledger,
                &mut rng,
                now,
                self.options.max_attempts_row,
            ) {
                Ok(generated) => generated,
                Err(err) => {
                    warn!(schema = %table.schema, table = %table.name, error = %err, "generation failed");
                    return Err(err);
                }
            };

            let batch = InsertBatch::new(table, generated.rows);
            if !batch.is_empty()
                && let Err(err) = sink.insert(&batch).await
            {
                warn!(schema = %table.schema, table = %table.name, error = %err, "insert failed");
                return Err(err.into());
            }
            ledger.commit(id, &batch.columns, &batch.rows);

            let rows_generated = batch.rows.len() as u64;
            report.tables.push(TableReport {
                schema: table.schema.clone(),
                table: table.name.clone(),
                rows_requested,
                rows_generated,
                retries: generated.retries,
            });
            report.retries_total += generated.retries;

            info!(
                schema = %table.schema,
                table = %table.name,
                rows_generated,
                retries = generated.retries,
                duration_ms = table_start.elapsed().as_millis() as u64,
                "table generated"
            );
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            seed,
            tables = report.tables.len(),
            rows = report.rows_total(),
            retries = report.retries_total,
            duration_ms = report.duration_ms,
            "generation completed"
        );
        Ok(report)
    }
}

fn generate_table(
    table: &Table,
    rows: u64,
    ledger: &Ledger,
    rng: &mut dyn RngCore,
    now: DateTime<Utc>,
    max_attempts_row: u32,
) -> Result<TableRows, GenerationError> {
    let max_attempts = max_attempts_row.max(1);
    let mut unique_sets = UniqueSet::for_table(table);
    let mut accepted = Vec::new();
    let mut retries = 0_u64;

    for _ in 0..rows {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let candidate = build_candidate(table, ledger, rng, now)?;
            if unique::admit(&mut unique_sets, &candidate) {
                accepted.push(candidate);
                break;
            }
            if attempts >= max_attempts {
                return Err(GenerationError::UniqueExhausted {
                    table: table.qualified_name(),
                });
            }
            retries += 1;
        }
    }

    Ok(TableRows {
        rows: accepted,
        retries,
    })
}

/// One candidate row: foreign-key columns copied from a sampled parent row,
/// everything else synthesized.
fn build_candidate(
    table: &Table,
    ledger: &Ledger,
    rng: &mut dyn RngCore,
    now: DateTime<Utc>,
) -> Result<Vec<Value>, GenerationError> {
    let mut slots: Vec<Option<Value>> = vec![None; table.columns.len()];

    for foreign_key in &table.foreign_keys {
        let target = &foreign_key.target;
        let row = ledger
            .sample_row(target.table, rng)
            .ok_or_else(|| GenerationError::NoParentRows {
                table: target.qualified_name(),
            })?;
        for (local, referenced) in foreign_key.columns.iter().zip(&target.columns) {
            if let Some(idx) = table.column_index(local) {
                let value = ledger
                    .value(target.table, referenced, row)
                    .cloned()
                    .unwrap_or(Value::Null);
                slots[idx] = Some(value);
            }
        }
    }

    let mut ctx = ValueContext::new(now, rng);
    Ok(table
        .columns
        .iter()
        .zip(slots)
        .map(|(column, slot)| slot.unwrap_or_else(|| column.generate_value(&mut ctx)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlseed_core::{Column, ForeignKey, ForeignKeyRef, SqlType, TypeFamily};

    fn int_column(name: &str) -> Column {
        Column::new(name, SqlType::new("int4", TypeFamily::Int))
    }

    fn parent_child() -> (SchemaGraph, TableId, TableId) {
        let mut graph = SchemaGraph::new();
        let parent = graph.create_table("", "parent").expect("parent");
        let child = graph.create_table("", "child").expect("child");
        {
            let table = graph.table_mut(parent);
            table.add_column(int_column("id")).expect("column");
            table.add_column(int_column("code")).expect("column");
            table
                .set_primary_key(vec!["id".to_string(), "code".to_string()])
                .expect("pk");
        }
        {
            let table = graph.table_mut(child);
            table.add_column(int_column("parent_id")).expect("column");
            table.add_column(int_column("parent_code")).expect("column");
            table.add_column(int_column("extra")).expect("column");
            table.add_foreign_key(ForeignKey {
                columns: vec!["parent_id".to_string(), "parent_code".to_string()],
                target: ForeignKeyRef {
                    table: parent,
                    schema: "public".to_string(),
                    table_name: "parent".to_string(),
                    columns: vec!["id".to_string(), "code".to_string()],
                },
            });
        }
        (graph, parent, child)
    }

    #[test]
    fn composite_foreign_keys_copy_one_parent_row() {
        let (graph, parent, child) = parent_child();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let now = Utc::now();
        let mut ledger = Ledger::new();
        let parents = vec![
            vec![Value::Int(1), Value::Int(10)],
            vec![Value::Int(2), Value::Int(20)],
            vec![Value::Int(3), Value::Int(30)],
        ];
        ledger.commit(parent, &["id".to_string(), "code".to_string()], &parents);

        let generated =
            generate_table(graph.table(child), 25, &ledger, &mut rng, now, 10).expect("rows");
        assert_eq!(generated.rows.len(), 25);
        for row in &generated.rows {
            assert!(parents.iter().any(|parent| parent[..] == row[..2]));
        }
    }

    #[test]
    fn missing_parent_rows_fail() {
        let (graph, parent, child) = parent_child();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ledger = Ledger::new();
        ledger.commit(parent, &["id".to_string(), "code".to_string()], &[]);

        let err = generate_table(graph.table(child), 1, &ledger, &mut rng, Utc::now(), 10)
            .expect_err("no parent rows");
        assert_eq!(err.to_string(), "table public.parent has no rows");
    }

    #[test]
    fn zero_rows_need_no_parents() {
        let (graph, _, child) = parent_child();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let ledger = Ledger::new();
        let generated = generate_table(graph.table(child), 0, &ledger, &mut rng, Utc::now(), 10)
            .expect("empty fill");
        assert!(generated.rows.is_empty());
        assert_eq!(generated.retries, 0);
    }
}
