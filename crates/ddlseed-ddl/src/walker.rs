//! Builds a [`SchemaGraph`] by walking parsed DDL statements.
//!
//! Structural problems are collected instead of aborting the walk, so a
//! single run reports every broken statement. Foreign keys are recorded
//! while walking and resolved once every table is known.

use ddlseed_core::{
    Column, ForeignKey, ForeignKeyRef, GenerationType, SchemaGraph, StructuralError, TableId,
    TableSettings,
};
use tracing::debug;

use crate::ast::{
    AlterTable, AlterTableCmd, ColumnTableDef, CreateSchema, CreateTable,
    ForeignKeyConstraintTableDef, Node, TableDef, UniqueConstraintTableDef,
};
use crate::directives::{column_directive, row_count};
use crate::error::{BuildError, Diagnostic, Warning};

pub const CHECK_WARNING: &str = "check constraints are not supported, program may fail";

/// Everything the walk produced: the graph plus the collected findings.
#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: SchemaGraph,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Warning>,
}

impl BuildOutcome {
    pub fn into_result(self) -> Result<(SchemaGraph, Vec<Warning>), BuildError> {
        if self.errors.is_empty() {
            Ok((self.graph, self.warnings))
        } else {
            Err(BuildError::Structural {
                diagnostics: self.errors,
            })
        }
    }
}

#[derive(Debug)]
struct PendingForeignKey {
    statement: String,
    table: TableId,
    def: ForeignKeyConstraintTableDef,
}

#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: SchemaGraph,
    pending: Vec<PendingForeignKey>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Warning>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every node of one statement. `text` is the statement's annotated
    /// source, used for directives and diagnostics.
    pub fn walk_statement(&mut self, text: &str, nodes: &[Node]) {
        for node in nodes {
            if self.visit(text, node) {
                break;
            }
        }
    }

    /// Apply one node; returns the stop signal (always `false`: a failing
    /// node is recorded and its siblings are still walked).
    pub fn visit(&mut self, text: &str, node: &Node) -> bool {
        let result = match node {
            Node::CreateSchema(create) => self.create_schema(text, create),
            Node::CreateTable(create) => self.create_table(text, create),
            Node::AlterTable(alter) => self.alter_table(text, alter),
        };
        if let Err(error) = result {
            self.record_error(text, error);
        }
        false
    }

    pub fn record_error(&mut self, statement: &str, error: StructuralError) {
        debug!(error = %error, "structural error");
        self.errors.push(Diagnostic {
            statement: statement.to_string(),
            error,
        });
    }

    fn warn(&mut self, statement: &str, message: impl Into<String>) {
        self.warnings.push(Warning {
            statement: statement.to_string(),
            message: message.into(),
        });
    }

    /// Resolve deferred foreign keys and hand back the result.
    pub fn finish(mut self) -> BuildOutcome {
        for pending in std::mem::take(&mut self.pending) {
            match resolve_foreign_key(&self.graph, &pending) {
                Ok(foreign_key) => self.graph.table_mut(pending.table).add_foreign_key(foreign_key),
                Err(error) => self.record_error(&pending.statement, error),
            }
        }

        debug!(
            tables = self.graph.table_count(),
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "schema graph built"
        );
        BuildOutcome {
            graph: self.graph,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    fn create_schema(&mut self, text: &str, create: &CreateSchema) -> Result<(), StructuralError> {
        if create.if_not_exists && self.graph.has_schema(&create.name) {
            self.warn(text, format!("schema {} already exists, skipping", create.name));
            return Ok(());
        }
        self.graph.create_schema(&create.name)
    }

    fn create_table(&mut self, text: &str, create: &CreateTable) -> Result<(), StructuralError> {
        let schema = create.table.schema_or_default();
        if create.if_not_exists && self.graph.table_id(schema, &create.table.name).is_some() {
            self.warn(
                text,
                format!("table {} already exists, skipping", create.table.name),
            );
            return Ok(());
        }
        let id = self.graph.create_table(schema, &create.table.name)?;

        for def in &create.defs {
            match def {
                TableDef::Column(column) => self.add_column(text, id, column)?,
                TableDef::Unique(unique) => self.apply_unique(id, unique)?,
                TableDef::ForeignKey(foreign_key) => self.defer_foreign_key(text, id, foreign_key),
                TableDef::Check(_) => self.warn(text, CHECK_WARNING),
            }
        }

        if let Some(rows) = row_count(text) {
            self.graph.table_mut(id).settings = Some(TableSettings { row_count: rows });
        }
        Ok(())
    }

    fn add_column(
        &mut self,
        text: &str,
        table: TableId,
        def: &ColumnTableDef,
    ) -> Result<(), StructuralError> {
        let mut column = Column::new(def.name.clone(), def.sql_type.clone());
        column.not_null = def.not_null;
        if let Some(directive) = column_directive(text, &def.name) {
            let generation = GenerationType::parse(directive, &column.sql_type).map_err(|source| {
                StructuralError::Directive {
                    column: def.name.clone(),
                    source,
                }
            })?;
            column.generation = Some(generation);
        }

        let table = self.graph.table_mut(table);
        table.add_column(column)?;
        if def.primary_key {
            table.extend_primary_key(&def.name)?;
        }
        Ok(())
    }

    fn apply_unique(
        &mut self,
        table: TableId,
        unique: &UniqueConstraintTableDef,
    ) -> Result<(), StructuralError> {
        let table = self.graph.table_mut(table);
        if unique.primary_key {
            table.set_primary_key(unique.columns.clone())
        } else {
            table.add_unique(unique.columns.clone())
        }
    }

    fn defer_foreign_key(&mut self, text: &str, table: TableId, def: &ForeignKeyConstraintTableDef) {
        self.pending.push(PendingForeignKey {
            statement: text.to_string(),
            table,
            def: def.clone(),
        });
    }

    fn alter_table(&mut self, text: &str, alter: &AlterTable) -> Result<(), StructuralError> {
        let id = self
            .graph
            .find_table(alter.table.schema_or_default(), &alter.table.name)?;

        for cmd in &alter.cmds {
            match cmd {
                AlterTableCmd::AddConstraint(TableDef::Unique(unique)) => {
                    self.apply_unique(id, unique)?;
                }
                AlterTableCmd::AddConstraint(TableDef::ForeignKey(foreign_key)) => {
                    self.defer_foreign_key(text, id, foreign_key);
                }
                AlterTableCmd::AddConstraint(TableDef::Check(_)) => self.warn(text, CHECK_WARNING),
                AlterTableCmd::AddConstraint(TableDef::Column(_)) | AlterTableCmd::Other => {}
                AlterTableCmd::AddColumn { column } => self.warn(
                    text,
                    format!(
                        "\"ADD COLUMN {column}\" must be in \"CREATE TABLE\" expression, \
                         not in \"ALTER TABLE\", column will be ignored"
                    ),
                ),
                AlterTableCmd::SetNotNull { column } => {
                    self.graph.table_mut(id).set_not_null(column)?;
                }
                AlterTableCmd::AlterPrimaryKey { columns } => {
                    self.graph.table_mut(id).set_primary_key(columns.clone())?;
                }
            }
        }
        Ok(())
    }
}

fn resolve_foreign_key(
    graph: &SchemaGraph,
    pending: &PendingForeignKey,
) -> Result<ForeignKey, StructuralError> {
    let def = &pending.def;
    let source = graph.table(pending.table);
    let target_id = graph.find_table(def.table.schema_or_default(), &def.table.name)?;
    let target = graph.table(target_id);

    let target_columns = if def.referenced_columns.is_empty() {
        if target.primary_key.is_empty() {
            return Err(StructuralError::MissingReferencedKey {
                table: source.qualified_name(),
                target: target.qualified_name(),
            });
        }
        target.primary_key.clone()
    } else {
        def.referenced_columns.clone()
    };

    if def.columns.len() != target_columns.len() {
        return Err(StructuralError::ForeignKeyArity {
            table: source.qualified_name(),
            local: def.columns.len(),
            referenced: target_columns.len(),
        });
    }
    source.ensure_columns(&def.columns)?;
    target.ensure_columns(&target_columns)?;

    Ok(ForeignKey {
        columns: def.columns.clone(),
        target: ForeignKeyRef {
            table: target_id,
            schema: target.schema.clone(),
            table_name: target.name.clone(),
            columns: target_columns,
        },
    })
}
