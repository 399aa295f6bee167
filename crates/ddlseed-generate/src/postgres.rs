use async_trait::async_trait;
use chrono::{Offset, Utc};
use sqlx::postgres::types::{PgInterval, PgTimeTz};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use ddlseed_core::Value;

use crate::errors::PersistError;
use crate::sink::{InsertBatch, RowSink};

/// Bind parameters Postgres accepts in a single statement.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Sink writing each table in its own transaction.
#[derive(Debug, Clone)]
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    /// Create a new sink using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowSink for PostgresSink {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&mut self, batch: &InsertBatch) -> Result<(), PersistError> {
        if batch.is_empty() || batch.columns.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(PersistError::Begin)?;
        for rows in batch.rows.chunks(rows_per_statement(batch.columns.len())) {
            let mut builder = insert_builder(batch, rows);
            debug!(table = %batch.qualified_name(), rows = rows.len(), "executing insert");
            if let Err(source) = builder.build().execute(&mut *tx).await {
                tx.rollback().await.map_err(PersistError::Rollback)?;
                return Err(PersistError::Execute {
                    table: batch.qualified_name(),
                    source,
                });
            }
        }
        tx.commit().await.map_err(PersistError::Commit)
    }
}

/// Rows that fit in one statement without exceeding [`MAX_BIND_PARAMS`].
pub fn rows_per_statement(columns: usize) -> usize {
    (MAX_BIND_PARAMS / columns.max(1)).max(1)
}

/// Multi-row `INSERT INTO "schema"."table" (...) VALUES ($1, ...), ...`.
pub fn insert_builder<'args>(
    batch: &InsertBatch,
    rows: &'args [Vec<Value>],
) -> QueryBuilder<'args, Postgres> {
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder
        .push(quote_ident(&batch.schema))
        .push(".")
        .push(quote_ident(&batch.table))
        .push(" (");
    {
        let mut columns = builder.separated(", ");
        for column in &batch.columns {
            columns.push(quote_ident(column));
        }
    }
    builder.push(") ");
    builder.push_values(rows, |mut tuple, row| {
        for value in row {
            push_value(&mut tuple, value);
        }
    });
    builder
}

fn push_value<'qb, 'args>(
    tuple: &mut Separated<'qb, 'args, Postgres, &'static str>,
    value: &Value,
) {
    match value {
        Value::Null => {
            tuple.push("NULL");
        }
        Value::Bool(value) => {
            tuple.push_bind(*value);
        }
        Value::Int(value) => {
            tuple.push_bind(*value);
        }
        Value::Float(value) => {
            tuple.push_bind(*value);
        }
        Value::Text(value) => {
            tuple.push_bind(value.clone());
        }
        Value::Json(value) => {
            tuple.push_bind(value.clone());
        }
        Value::Uuid(value) => {
            tuple.push_bind(*value);
        }
        Value::Date(value) => {
            tuple.push_bind(*value);
        }
        Value::Time(value) => {
            tuple.push_bind(*value);
        }
        Value::TimeTz(value) => {
            tuple.push_bind(PgTimeTz {
                time: *value,
                offset: Utc.fix(),
            });
        }
        Value::Timestamp(value) => {
            tuple.push_bind(*value);
        }
        Value::TimestampTz(value) => {
            tuple.push_bind(*value);
        }
        Value::Interval(value) => match value.num_microseconds() {
            Some(microseconds) => {
                tuple.push_bind(PgInterval {
                    months: 0,
                    days: 0,
                    microseconds,
                });
            }
            None => {
                tuple.push("NULL");
            }
        },
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
