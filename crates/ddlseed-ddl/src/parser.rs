//! Adapter from `pg_query` parse trees to [`crate::ast`] nodes.

use ddlseed_core::{SqlType, TypeFamily};
use pg_query::NodeEnum;
use pg_query::protobuf::a_const::Val;
use pg_query::protobuf::{
    AlterTableStmt, AlterTableType, ColumnDef, ConstrType, Constraint, CreateStmt, RangeVar,
    TypeName,
};

use crate::ast::{
    AlterTable, AlterTableCmd, CheckConstraintTableDef, ColumnTableDef, CreateSchema, CreateTable,
    ForeignKeyConstraintTableDef, Node, QualifiedName, TableDef, UniqueConstraintTableDef,
};

/// One statement of a chunk together with the part of the chunk text it
/// came from (through the end of the line holding its `;`).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement<'a> {
    pub text: &'a str,
    pub nodes: Vec<Node>,
}

pub fn parse_chunk(chunk: &str) -> Result<Vec<ParsedStatement<'_>>, pg_query::Error> {
    let parsed = pg_query::parse(chunk)?;
    let mut statements = Vec::new();
    let mut cursor = 0_usize;

    for raw in parsed.protobuf.stmts {
        let location = usize::try_from(raw.stmt_location).unwrap_or(0);
        let end = match usize::try_from(raw.stmt_len) {
            Ok(0) | Err(_) => chunk.len(),
            Ok(len) => location.saturating_add(len).min(chunk.len()),
        };
        let line_end = chunk
            .get(end..)
            .and_then(|rest| rest.find('\n'))
            .map(|offset| end + offset)
            .unwrap_or(chunk.len());
        let start = location.max(cursor).min(line_end);
        let text = chunk.get(start..line_end).unwrap_or(chunk);
        cursor = line_end;

        let nodes = match raw.stmt.and_then(|stmt| stmt.node) {
            Some(node) => convert_statement(&node),
            None => Vec::new(),
        };
        statements.push(ParsedStatement { text, nodes });
    }

    Ok(statements)
}

fn convert_statement(node: &NodeEnum) -> Vec<Node> {
    match node {
        NodeEnum::CreateSchemaStmt(stmt) => {
            let mut nodes = Vec::new();
            if !stmt.schemaname.is_empty() {
                nodes.push(Node::CreateSchema(CreateSchema {
                    name: stmt.schemaname.clone(),
                    if_not_exists: stmt.if_not_exists,
                }));
            }
            for element in &stmt.schema_elts {
                if let Some(NodeEnum::CreateStmt(create)) = element.node.as_ref() {
                    let mut table = convert_create_table(create);
                    if table.table.schema.is_none() && !stmt.schemaname.is_empty() {
                        table.table.schema = Some(stmt.schemaname.clone());
                    }
                    nodes.push(Node::CreateTable(table));
                }
            }
            nodes
        }
        NodeEnum::CreateStmt(stmt) => vec![Node::CreateTable(convert_create_table(stmt))],
        NodeEnum::AlterTableStmt(stmt) => convert_alter_table(stmt)
            .map(Node::AlterTable)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn convert_create_table(stmt: &CreateStmt) -> CreateTable {
    let table = stmt
        .relation
        .as_ref()
        .map(qualified_name)
        .unwrap_or_else(|| QualifiedName {
            schema: None,
            name: String::new(),
        });

    let mut defs = Vec::with_capacity(stmt.table_elts.len());
    for element in &stmt.table_elts {
        match element.node.as_ref() {
            Some(NodeEnum::ColumnDef(column)) => convert_column(column, &mut defs),
            Some(NodeEnum::Constraint(constraint)) => {
                defs.extend(convert_constraint(constraint, None));
            }
            _ => {}
        }
    }

    CreateTable {
        table,
        if_not_exists: stmt.if_not_exists,
        defs,
    }
}

/// Push the column followed by its hoisted column-level constraints.
fn convert_column(column: &ColumnDef, defs: &mut Vec<TableDef>) {
    let mut def = ColumnTableDef {
        name: column.colname.clone(),
        sql_type: convert_type(column.type_name.as_ref()),
        not_null: column.is_not_null,
        primary_key: false,
    };
    let mut hoisted = Vec::new();

    for node in &column.constraints {
        let Some(NodeEnum::Constraint(constraint)) = node.node.as_ref() else {
            continue;
        };
        match ConstrType::try_from(constraint.contype) {
            Ok(ConstrType::ConstrNotnull) => def.not_null = true,
            Ok(ConstrType::ConstrPrimary) => {
                def.primary_key = true;
                def.not_null = true;
            }
            Ok(ConstrType::ConstrUnique) => {
                hoisted.push(TableDef::Unique(UniqueConstraintTableDef {
                    columns: vec![column.colname.clone()],
                    primary_key: false,
                }));
            }
            Ok(ConstrType::ConstrForeign | ConstrType::ConstrCheck) => {
                hoisted.extend(convert_constraint(constraint, Some(column.colname.as_str())));
            }
            _ => {}
        }
    }

    defs.push(TableDef::Column(def));
    defs.extend(hoisted);
}

fn convert_constraint(constraint: &Constraint, column: Option<&str>) -> Option<TableDef> {
    match ConstrType::try_from(constraint.contype).ok()? {
        kind @ (ConstrType::ConstrPrimary | ConstrType::ConstrUnique) => {
            let columns = identifiers(&constraint.keys);
            if columns.is_empty() {
                return None;
            }
            Some(TableDef::Unique(UniqueConstraintTableDef {
                columns,
                primary_key: kind == ConstrType::ConstrPrimary,
            }))
        }
        ConstrType::ConstrForeign => {
            let columns = if constraint.fk_attrs.is_empty() {
                vec![column?.to_string()]
            } else {
                identifiers(&constraint.fk_attrs)
            };
            Some(TableDef::ForeignKey(ForeignKeyConstraintTableDef {
                columns,
                table: qualified_name(constraint.pktable.as_ref()?),
                referenced_columns: identifiers(&constraint.pk_attrs),
            }))
        }
        ConstrType::ConstrCheck => Some(TableDef::Check(CheckConstraintTableDef {
            name: (!constraint.conname.is_empty()).then(|| constraint.conname.clone()),
        })),
        _ => None,
    }
}

fn convert_alter_table(stmt: &AlterTableStmt) -> Option<AlterTable> {
    let table = qualified_name(stmt.relation.as_ref()?);
    let mut cmds = Vec::with_capacity(stmt.cmds.len());

    for node in &stmt.cmds {
        let Some(NodeEnum::AlterTableCmd(cmd)) = node.node.as_ref() else {
            continue;
        };
        let definition = cmd.def.as_ref().and_then(|def| def.node.as_ref());
        let command = match (AlterTableType::try_from(cmd.subtype), definition) {
            (Ok(AlterTableType::AtAddConstraint), Some(NodeEnum::Constraint(constraint))) => {
                match convert_constraint(constraint, None) {
                    Some(TableDef::Unique(unique)) if unique.primary_key => {
                        AlterTableCmd::AlterPrimaryKey {
                            columns: unique.columns,
                        }
                    }
                    Some(def) => AlterTableCmd::AddConstraint(def),
                    None => AlterTableCmd::Other,
                }
            }
            (Ok(AlterTableType::AtAddColumn), Some(NodeEnum::ColumnDef(column))) => {
                AlterTableCmd::AddColumn {
                    column: column.colname.clone(),
                }
            }
            (Ok(AlterTableType::AtSetNotNull), _) => AlterTableCmd::SetNotNull {
                column: cmd.name.clone(),
            },
            _ => AlterTableCmd::Other,
        };
        cmds.push(command);
    }

    Some(AlterTable { table, cmds })
}

fn convert_type(type_name: Option<&TypeName>) -> SqlType {
    let Some(type_name) = type_name else {
        return SqlType::new("unknown", TypeFamily::Other);
    };
    let names = identifiers(&type_name.names);
    let Some(name) = names.last() else {
        return SqlType::new("unknown", TypeFamily::Other);
    };
    let modifiers: Vec<i64> = type_name
        .typmods
        .iter()
        .filter_map(|node| match node.node.as_ref() {
            Some(NodeEnum::AConst(constant)) => match constant.val.as_ref() {
                Some(Val::Ival(value)) => Some(i64::from(value.ival)),
                _ => None,
            },
            _ => None,
        })
        .collect();
    SqlType::from_pg_name(name, &modifiers, !type_name.array_bounds.is_empty())
}

fn identifiers(nodes: &[pg_query::Node]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|node| match node.node.as_ref() {
            Some(NodeEnum::String(value)) => Some(value.sval.clone()),
            _ => None,
        })
        .collect()
}

fn qualified_name(relation: &RangeVar) -> QualifiedName {
    QualifiedName {
        schema: (!relation.schemaname.is_empty()).then(|| relation.schemaname.clone()),
        name: relation.relname.clone(),
    }
}
