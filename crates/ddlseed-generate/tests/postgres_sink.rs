use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use ddlseed_ddl::build_schema;
use ddlseed_generate::{GenerateOptions, GenerationEngine, PostgresSink};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const SCHEMA: &str = "ddlseed_it";

const DDL: &[&str] = &[
    "DROP SCHEMA IF EXISTS ddlseed_it CASCADE",
    "CREATE SCHEMA ddlseed_it",
    "CREATE TABLE ddlseed_it.customers (\n    \
     -- count:25\n    \
     id int PRIMARY KEY,\n    \
     name varchar(40) NOT NULL, -- type:name\n    \
     tier text, -- oneof:[gold, silver]\n    \
     joined date,\n    \
     wake_up timetz,\n    \
     idle_for interval,\n    \
     profile jsonb,\n    \
     token uuid,\n    \
     score numeric(6, 2),\n    \
     small smallint\n\
     )",
    "CREATE TABLE ddlseed_it.orders (\n    \
     -- count:60\n    \
     id bigint PRIMARY KEY,\n    \
     customer_id int REFERENCES ddlseed_it.customers (id),\n    \
     placed_at timestamptz\n\
     )",
];

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn reset_schema(pool: &PgPool) -> Result<()> {
    for statement in DDL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("executing {statement}"))?;
    }
    Ok(())
}

async fn count(pool: &PgPool, table: &str) -> Result<i64> {
    let sql = format!("SELECT count(*) FROM {SCHEMA}.{table}");
    sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .with_context(|| format!("counting {table}"))
}

#[tokio::test]
async fn fills_live_database() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;
    reset_schema(&pool).await?;

    let script = DDL[1..].join(";\n") + ";";
    let (graph, _) = build_schema(&script)
        .into_result()
        .context("building schema graph")?;
    let mut sink = PostgresSink::new(pool.clone());
    let report = GenerationEngine::new(GenerateOptions {
        seed: Some(17),
        ..GenerateOptions::default()
    })
    .run(&graph, &mut sink)
    .await?;

    assert_eq!(report.rows_total(), 85);
    assert_eq!(count(&pool, "customers").await?, 25);
    assert_eq!(count(&pool, "orders").await?, 60);

    let orphans: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM ddlseed_it.orders o \
         LEFT JOIN ddlseed_it.customers c ON c.id = o.customer_id WHERE c.id IS NULL",
    )
    .fetch_one(&pool)
    .await?;
    assert_eq!(orphans, 0);

    sqlx::query("DROP SCHEMA ddlseed_it CASCADE")
        .execute(&pool)
        .await?;
    Ok(())
}
