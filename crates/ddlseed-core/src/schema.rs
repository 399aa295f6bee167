use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;
use crate::generation::GenerationType;
use crate::types::SqlType;
use crate::value::{Value, ValueContext, random_value};

/// Schema used for unqualified names (and the empty-string alias).
pub const DEFAULT_SCHEMA: &str = "public";
/// Rows generated for a table without a `-- count:` directive.
pub const DEFAULT_ROW_COUNT: u64 = 100;

/// Stable handle to a table in the [`SchemaGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(usize);

impl TableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Every schema and table reconstructed from a DDL script.
///
/// Tables are owned by a flat arena in declaration order; schemas and
/// foreign keys refer to them through [`TableId`].
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    schemas: BTreeMap<String, Schema>,
    tables: Vec<Table>,
}

impl Default for SchemaGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGraph {
    pub fn new() -> Self {
        let mut schemas = BTreeMap::new();
        schemas.insert(DEFAULT_SCHEMA.to_string(), Schema::new(DEFAULT_SCHEMA));
        Self {
            schemas,
            tables: Vec::new(),
        }
    }

    pub fn normalize_schema_name(name: &str) -> &str {
        if name.is_empty() { DEFAULT_SCHEMA } else { name }
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas
            .contains_key(Self::normalize_schema_name(name))
    }

    pub fn create_schema(&mut self, name: &str) -> Result<(), StructuralError> {
        let name = Self::normalize_schema_name(name);
        if self.schemas.contains_key(name) {
            return Err(StructuralError::SchemaAlreadyDeclared(name.to_string()));
        }
        self.schemas.insert(name.to_string(), Schema::new(name));
        Ok(())
    }

    pub fn create_table(&mut self, schema: &str, name: &str) -> Result<TableId, StructuralError> {
        let schema_name = Self::normalize_schema_name(schema);
        let owner = self
            .schemas
            .get_mut(schema_name)
            .ok_or_else(|| StructuralError::SchemaNotFound(schema_name.to_string()))?;
        if owner.tables.contains_key(name) {
            return Err(StructuralError::TableAlreadyDeclared {
                schema: schema_name.to_string(),
                table: name.to_string(),
            });
        }

        let id = TableId(self.tables.len());
        owner.tables.insert(name.to_string(), id);
        self.tables.push(Table::new(schema_name, name));
        Ok(id)
    }

    pub fn table_id(&self, schema: &str, name: &str) -> Option<TableId> {
        self.schemas
            .get(Self::normalize_schema_name(schema))
            .and_then(|owner| owner.tables.get(name).copied())
    }

    /// Like [`SchemaGraph::table_id`], but reports which part is missing.
    pub fn find_table(&self, schema: &str, name: &str) -> Result<TableId, StructuralError> {
        let schema_name = Self::normalize_schema_name(schema);
        let owner = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| StructuralError::SchemaNotFound(schema_name.to_string()))?;
        owner
            .tables
            .get(name)
            .copied()
            .ok_or_else(|| StructuralError::TableNotFound {
                schema: schema_name.to_string(),
                table: name.to_string(),
            })
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub fn table_mut(&mut self, id: TableId) -> &mut Table {
        &mut self.tables[id.0]
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = (TableId, &Table)> {
        self.tables
            .iter()
            .enumerate()
            .map(|(idx, table)| (TableId(idx), table))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// A namespace mapping table names to arena ids.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub tables: BTreeMap<String, TableId>,
}

impl Schema {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub schema: String,
    pub name: String,
    /// Columns in registration order; this is also the INSERT column order.
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub unique_constraints: Vec<Vec<String>>,
    pub foreign_keys: Vec<ForeignKey>,
    pub settings: Option<TableSettings>,
}

impl Table {
    fn new(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            settings: None,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), StructuralError> {
        if self.column(&column.name).is_some() {
            return Err(StructuralError::ColumnAlreadyDeclared {
                table: self.qualified_name(),
                column: column.name,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Replace the primary key with `columns`, preserving their order.
    pub fn set_primary_key(&mut self, columns: Vec<String>) -> Result<(), StructuralError> {
        self.ensure_columns(&columns)?;
        self.primary_key = columns;
        Ok(())
    }

    /// Append one column to the primary key (inline `PRIMARY KEY`).
    pub fn extend_primary_key(&mut self, column: &str) -> Result<(), StructuralError> {
        self.ensure_columns(std::slice::from_ref(&column.to_string()))?;
        if !self.primary_key.iter().any(|existing| existing == column) {
            self.primary_key.push(column.to_string());
        }
        Ok(())
    }

    /// Register a unique group; single-column groups also flag the column.
    pub fn add_unique(&mut self, columns: Vec<String>) -> Result<(), StructuralError> {
        self.ensure_columns(&columns)?;
        if let [single] = columns.as_slice()
            && let Some(column) = self.column_mut(single)
        {
            column.unique = true;
        }
        self.unique_constraints.push(columns);
        Ok(())
    }

    pub fn set_not_null(&mut self, name: &str) -> Result<(), StructuralError> {
        let table = self.qualified_name();
        let column = self
            .column_mut(name)
            .ok_or_else(|| StructuralError::ColumnNotFound {
                table,
                column: name.to_string(),
            })?;
        column.not_null = true;
        Ok(())
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        self.foreign_keys.push(foreign_key);
    }

    pub fn row_count(&self, default_rows: u64) -> u64 {
        self.settings
            .as_ref()
            .map(|settings| settings.row_count)
            .unwrap_or(default_rows)
    }

    /// Declared unique groups followed by the primary key; empty and
    /// repeated groups are dropped.
    pub fn uniqueness_groups(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = Vec::new();
        for group in self
            .unique_constraints
            .iter()
            .chain(std::iter::once(&self.primary_key))
        {
            if group.is_empty() || groups.contains(group) {
                continue;
            }
            groups.push(group.clone());
        }
        groups
    }

    pub fn ensure_columns(&self, columns: &[String]) -> Result<(), StructuralError> {
        match columns.iter().find(|name| self.column(name).is_none()) {
            Some(missing) => Err(StructuralError::ColumnNotFound {
                table: self.qualified_name(),
                column: missing.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub not_null: bool,
    /// Fast-path marker for a single-column unique constraint.
    pub unique: bool,
    pub generation: Option<GenerationType>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            not_null: false,
            unique: false,
            generation: None,
        }
    }

    /// Synthesize one value, honouring the column's override if any.
    pub fn generate_value(&self, ctx: &mut ValueContext<'_>) -> Value {
        match &self.generation {
            Some(generation) => generation.generate(&self.sql_type, ctx),
            None => random_value(&self.sql_type, ctx),
        }
    }
}

/// Positional mapping from local columns onto a target table's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub target: ForeignKeyRef,
}

/// Non-owning reference to the table a foreign key points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: TableId,
    pub schema: String,
    pub table_name: String,
    pub columns: Vec<String>,
}

impl ForeignKeyRef {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSettings {
    pub row_count: u64,
}
