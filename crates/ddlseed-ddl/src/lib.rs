//! DDL ingestion for ddlseed.
//!
//! Splits a formatted script into statements, parses the eligible ones with
//! `pg_query`, and walks them into a [`ddlseed_core::SchemaGraph`] while
//! extracting inline generation directives.

pub mod ast;
pub mod directives;
pub mod error;
pub mod parser;
pub mod script;
pub mod walker;

use ddlseed_core::StructuralError;
use tracing::debug;

pub use error::{BuildError, Diagnostic, Warning};
pub use walker::{BuildOutcome, CHECK_WARNING, GraphBuilder};

/// Build the schema graph for a whole script.
///
/// Never fails outright: structural problems, including chunks the parser
/// rejects, are collected in the returned [`BuildOutcome`]. A chunk may hold
/// several statements; each one is filtered on its own.
pub fn build_schema(script: &str) -> BuildOutcome {
    let mut builder = GraphBuilder::new();

    for chunk in script::split_statements(script) {
        let statements = match parser::parse_chunk(chunk) {
            Ok(statements) => statements,
            Err(err) if !script::mentions_walkable(chunk) => {
                debug!(
                    statement = %first_line(chunk),
                    error = %err,
                    "skipping unparsable statement"
                );
                continue;
            }
            Err(err) => {
                builder.record_error(chunk, StructuralError::Parse(err.to_string()));
                continue;
            }
        };

        for statement in statements {
            if !script::is_walkable(statement.text) {
                debug!(statement = %first_line(statement.text), "skipping statement");
                continue;
            }
            if script::is_identity_boilerplate(statement.text) {
                debug!(statement = %first_line(statement.text), "skipping identity sequence");
                continue;
            }
            builder.walk_statement(statement.text, &statement.nodes);
        }
    }

    builder.finish()
}

fn first_line(text: &str) -> &str {
    script::statement_head(text).lines().next().unwrap_or_default()
}
