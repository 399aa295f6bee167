use thiserror::Error;

use crate::generation::DirectiveError;

/// Structural problems found while reconstructing a schema from DDL.
///
/// These are collected rather than raised: the walker keeps going so the
/// caller can report every problem in a script at once.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("schema {0} already declared")]
    SchemaAlreadyDeclared(String),
    #[error("schema {0} not found")]
    SchemaNotFound(String),
    #[error("table {schema}.{table} already declared")]
    TableAlreadyDeclared { schema: String, table: String },
    #[error("table {schema}.{table} not found")]
    TableNotFound { schema: String, table: String },
    #[error("column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    #[error("column {column} already declared in table {table}")]
    ColumnAlreadyDeclared { table: String, column: String },
    #[error(
        "foreign key on {table} maps {local} column(s) onto {referenced} referenced column(s)"
    )]
    ForeignKeyArity {
        table: String,
        local: usize,
        referenced: usize,
    },
    #[error("foreign key on {table} references {target}, which has no primary key")]
    MissingReferencedKey { table: String, target: String },
    #[error("column {column}: {source}")]
    Directive {
        column: String,
        #[source]
        source: DirectiveError,
    },
    #[error("parser error: {0}")]
    Parse(String),
}

/// A foreign-key cycle, reported as the chain of `schema.table` hops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cycle detected in foreign key constraints: {}", .path.join(" -> "))]
pub struct CycleError {
    pub path: Vec<String>,
}
