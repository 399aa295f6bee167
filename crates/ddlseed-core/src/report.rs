use serde::Serialize;

use crate::graph::{FkGraphSummary, resolve_fill_order, summarize_fk_graph};
use crate::schema::SchemaGraph;
use crate::types::SqlType;

/// Serialisable view of a reconstructed schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    pub tables: Vec<TableSummary>,
    pub fk_graph: FkGraphSummary,
    pub fill_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnSummary>,
    pub primary_key: Vec<String>,
    pub unique_constraints: Vec<Vec<String>>,
    pub foreign_keys: Vec<ForeignKeySummary>,
    pub row_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub sql_type: SqlType,
    pub not_null: bool,
    pub unique: bool,
    pub directive: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForeignKeySummary {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

pub fn build_schema_report(graph: &SchemaGraph, default_rows: u64) -> SchemaReport {
    let tables = graph
        .tables()
        .map(|(_, table)| TableSummary {
            schema: table.schema.clone(),
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|column| ColumnSummary {
                    name: column.name.clone(),
                    sql_type: column.sql_type.clone(),
                    not_null: column.not_null,
                    unique: column.unique,
                    directive: column.generation.as_ref().map(|g| g.directive()),
                })
                .collect(),
            primary_key: table.primary_key.clone(),
            unique_constraints: table.unique_constraints.clone(),
            foreign_keys: table
                .foreign_keys
                .iter()
                .map(|fk| ForeignKeySummary {
                    columns: fk.columns.clone(),
                    referenced_table: fk.target.qualified_name(),
                    referenced_columns: fk.target.columns.clone(),
                })
                .collect(),
            row_count: table.row_count(default_rows),
        })
        .collect();

    let (fill_order, cycle) = match resolve_fill_order(graph) {
        Ok(order) => (
            Some(
                order
                    .into_iter()
                    .map(|id| graph.table(id).qualified_name())
                    .collect(),
            ),
            None,
        ),
        Err(err) => (None, Some(err.path)),
    };

    SchemaReport {
        tables,
        fk_graph: summarize_fk_graph(graph),
        fill_order,
        cycle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationType;
    use crate::schema::{Column, ForeignKey, ForeignKeyRef, TableSettings};
    use crate::types::TypeFamily;

    #[test]
    fn report_lists_tables_and_order() {
        let mut graph = SchemaGraph::new();
        let parent = graph.create_table("public", "parent").unwrap();
        let child = graph.create_table("public", "child").unwrap();
        let int = SqlType::new("int4", TypeFamily::Int).with_width(4);
        let text = SqlType::new("text", TypeFamily::String);

        graph
            .table_mut(parent)
            .add_column(Column::new("id", int.clone()))
            .unwrap();
        graph
            .table_mut(parent)
            .set_primary_key(vec!["id".to_string()])
            .unwrap();
        let mut name = Column::new("name", text.clone());
        name.generation = Some(GenerationType::parse("type:name", &text).unwrap());
        graph.table_mut(child).add_column(name).unwrap();
        graph
            .table_mut(child)
            .add_column(Column::new("parent_id", int))
            .unwrap();
        graph.table_mut(child).add_foreign_key(ForeignKey {
            columns: vec!["parent_id".to_string()],
            target: ForeignKeyRef {
                table: parent,
                schema: "public".to_string(),
                table_name: "parent".to_string(),
                columns: vec!["id".to_string()],
            },
        });
        graph.table_mut(child).settings = Some(TableSettings { row_count: 7 });

        let report = build_schema_report(&graph, 100);
        assert_eq!(report.tables.len(), 2);
        assert_eq!(report.tables[0].row_count, 100);
        assert_eq!(report.tables[1].row_count, 7);
        assert_eq!(
            report.tables[1].columns[0].directive.as_deref(),
            Some("type:name")
        );
        assert_eq!(report.tables[1].foreign_keys[0].referenced_table, "public.parent");
        assert_eq!(
            report.fill_order,
            Some(vec!["public.parent".to_string(), "public.child".to_string()])
        );
        assert!(report.cycle.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fk_graph"]["edges"], 1);
    }
}
