//! The slice of the Postgres statement tree the graph builder walks.

use ddlseed_core::SqlType;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    CreateSchema(CreateSchema),
    CreateTable(CreateTable),
    AlterTable(AlterTable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn schema_or_default(&self) -> &str {
        self.schema.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSchema {
    pub name: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: QualifiedName,
    pub if_not_exists: bool,
    /// Column definitions and constraints in source order, with column-level
    /// constraints hoisted right after their column.
    pub defs: Vec<TableDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub table: QualifiedName,
    pub cmds: Vec<AlterTableCmd>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableDef {
    Column(ColumnTableDef),
    Unique(UniqueConstraintTableDef),
    ForeignKey(ForeignKeyConstraintTableDef),
    Check(CheckConstraintTableDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTableDef {
    pub name: String,
    pub sql_type: SqlType,
    pub not_null: bool,
    pub primary_key: bool,
}

/// `UNIQUE (...)` or `PRIMARY KEY (...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraintTableDef {
    pub columns: Vec<String>,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraintTableDef {
    pub columns: Vec<String>,
    pub table: QualifiedName,
    /// Empty when the reference names no columns (target primary key).
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckConstraintTableDef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableCmd {
    AddConstraint(TableDef),
    AddColumn { column: String },
    SetNotNull { column: String },
    AlterPrimaryKey { columns: Vec<String> },
    /// Anything the builder has no use for (defaults, identity, owners...).
    Other,
}
