//! Core contracts for ddlseed.
//!
//! This crate holds the in-memory schema graph reconstructed from DDL, the
//! per-column generation types, random value synthesis, and the foreign-key
//! fill-order resolver shared by the DDL walker and the generation engine.

pub mod error;
pub mod generation;
pub mod graph;
pub mod presets;
pub mod report;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{CycleError, StructuralError};
pub use generation::{DirectiveError, GenerationKind, GenerationType, Oneof, Range};
pub use graph::{FkGraphSummary, resolve_fill_order, summarize_fk_graph};
pub use presets::Preset;
pub use report::{SchemaReport, build_schema_report};
pub use schema::{
    Column, DEFAULT_ROW_COUNT, DEFAULT_SCHEMA, ForeignKey, ForeignKeyRef, Schema, SchemaGraph,
    Table, TableId, TableSettings,
};
pub use types::{SqlType, TypeFamily};
pub use value::{Value, ValueContext};
