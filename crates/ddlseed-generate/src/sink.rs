use async_trait::async_trait;
use serde::Serialize;

use ddlseed_core::{Table, Value};

use crate::errors::PersistError;

/// All accepted rows of one table, in column registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertBatch {
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl InsertBatch {
    pub fn new(table: &Table, rows: Vec<Vec<Value>>) -> Self {
        Self {
            schema: table.schema.clone(),
            table: table.name.clone(),
            columns: table.columns.iter().map(|column| column.name.clone()).collect(),
            rows,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Destination for generated rows. Each call persists one table atomically.
#[async_trait]
pub trait RowSink {
    /// Short identifier used in logs (e.g. `postgres`).
    fn name(&self) -> &'static str;

    async fn insert(&mut self, batch: &InsertBatch) -> Result<(), PersistError>;
}

/// Keeps batches in memory; used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Vec<InsertBatch>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[InsertBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<InsertBatch> {
        self.batches
    }

    pub fn rows(&self, schema: &str, table: &str) -> Option<&[Vec<Value>]> {
        self.batches
            .iter()
            .find(|batch| batch.schema == schema && batch.table == table)
            .map(|batch| batch.rows.as_slice())
    }
}

#[async_trait]
impl RowSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&mut self, batch: &InsertBatch) -> Result<(), PersistError> {
        self.batches.push(batch.clone());
        Ok(())
    }
}
