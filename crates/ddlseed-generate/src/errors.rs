use ddlseed_core::CycleError;
use thiserror::Error;

/// Errors that abort a fill run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("table {table} has no rows")]
    NoParentRows { table: String },
    #[error("unable to generate unique row for table {table}")]
    UniqueExhausted { table: String },
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// A failed step of a per-table transaction, named by phase.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("unable to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),
    #[error("unable to insert rows into {table}: {source}")]
    Execute {
        table: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("unable to rollback transaction: {0}")]
    Rollback(#[source] sqlx::Error),
    #[error("unable to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),
}
