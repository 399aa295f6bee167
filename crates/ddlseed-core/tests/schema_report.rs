use ddlseed_core::{
    Column, ForeignKey, ForeignKeyRef, GenerationType, SchemaGraph, SqlType, TableId,
    TableSettings, TypeFamily, build_schema_report,
};
use serde_json::json;

fn int4() -> SqlType {
    SqlType::new("int4", TypeFamily::Int).with_width(4)
}

fn keyed_table(graph: &mut SchemaGraph, schema: &str, name: &str) -> TableId {
    let id = graph.create_table(schema, name).expect("create table");
    let table = graph.table_mut(id);
    table.add_column(Column::new("id", int4())).expect("id column");
    table
        .set_primary_key(vec!["id".to_string()])
        .expect("primary key");
    id
}

fn reference(graph: &mut SchemaGraph, from: TableId, column: &str, to: TableId) {
    let target = graph.table(to);
    let target = ForeignKeyRef {
        table: to,
        schema: target.schema.clone(),
        table_name: target.name.clone(),
        columns: vec!["id".to_string()],
    };
    let table = graph.table_mut(from);
    table
        .add_column(Column::new(column, int4()))
        .expect("fk column");
    table.add_foreign_key(ForeignKey {
        columns: vec![column.to_string()],
        target,
    });
}

#[test]
fn report_serializes_tables_and_fill_order() {
    let mut graph = SchemaGraph::new();
    graph.create_schema("shop").expect("schema");
    let orders = keyed_table(&mut graph, "shop", "orders");
    let customers = keyed_table(&mut graph, "shop", "customers");
    reference(&mut graph, orders, "customer_id", customers);

    let varchar = SqlType::new("varchar", TypeFamily::String).with_width(64);
    let mut email = Column::new("email", varchar.clone());
    email.unique = true;
    email.generation = Some(GenerationType::parse("type:email", &varchar).expect("directive"));
    graph
        .table_mut(customers)
        .add_column(email)
        .expect("email column");
    graph.table_mut(orders).settings = Some(TableSettings { row_count: 40 });

    let report = build_schema_report(&graph, 10);
    let json = serde_json::to_value(&report).expect("serialize report");

    assert_eq!(json["fill_order"], json!(["shop.customers", "shop.orders"]));
    assert_eq!(json["cycle"], serde_json::Value::Null);
    assert_eq!(json["fk_graph"], json!({ "nodes": 2, "edges": 1 }));

    let orders_json = &json["tables"][0];
    assert_eq!(orders_json["name"], "orders");
    assert_eq!(orders_json["row_count"], 40);
    assert_eq!(
        orders_json["foreign_keys"][0],
        json!({
            "columns": ["customer_id"],
            "referenced_table": "shop.customers",
            "referenced_columns": ["id"],
        })
    );

    let customers_json = &json["tables"][1];
    assert_eq!(customers_json["row_count"], 10);
    assert_eq!(customers_json["primary_key"], json!(["id"]));
    let email_json = &customers_json["columns"][1];
    assert_eq!(email_json["directive"], "type:email");
    assert_eq!(email_json["unique"], true);
    assert_eq!(email_json["sql_type"]["family"], "string");
    assert_eq!(email_json["sql_type"]["width"], 64);
}

#[test]
fn report_carries_cycle_instead_of_order() {
    let mut graph = SchemaGraph::new();
    let a = keyed_table(&mut graph, "", "a");
    let b = keyed_table(&mut graph, "", "b");
    reference(&mut graph, a, "b_id", b);
    reference(&mut graph, b, "a_id", a);

    let report = build_schema_report(&graph, 5);
    assert!(report.fill_order.is_none());
    let cycle = report.cycle.as_ref().expect("cycle reported");
    assert_eq!(cycle.first(), cycle.last());
    assert!(cycle.contains(&"public.a".to_string()));
    assert!(cycle.contains(&"public.b".to_string()));

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["fill_order"], serde_json::Value::Null);
    assert_eq!(json["fk_graph"]["edges"], 2);
}
