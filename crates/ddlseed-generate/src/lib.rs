//! Row generation and persistence for ddlseed.
//!
//! The engine walks a [`ddlseed_core::SchemaGraph`] in foreign-key order,
//! synthesizes rows that satisfy each table's uniqueness groups, and hands
//! every table to a [`RowSink`] as one batch.

pub mod engine;
pub mod errors;
pub mod ledger;
pub mod model;
pub mod postgres;
pub mod sink;
pub mod unique;

pub use engine::GenerationEngine;
pub use errors::{GenerationError, PersistError};
pub use model::{GenerateOptions, GenerationReport, TableReport};
pub use postgres::PostgresSink;
pub use sink::{InsertBatch, MemorySink, RowSink};
