use serde::{Deserialize, Serialize};

use crate::error::CycleError;
use crate::schema::{SchemaGraph, TableId};

/// Summary of FK graph structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

pub fn summarize_fk_graph(graph: &SchemaGraph) -> FkGraphSummary {
    FkGraphSummary {
        nodes: graph.table_count(),
        edges: graph
            .tables()
            .map(|(_, table)| table.foreign_keys.len())
            .sum(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Finished,
}

/// Order every table so that foreign-key targets come before the tables
/// referencing them.
///
/// Depth-first over tables in declaration order with an explicit frame stack
/// of `(table, next edge)`. A same-table foreign key is a one-node cycle.
pub fn resolve_fill_order(graph: &SchemaGraph) -> Result<Vec<TableId>, CycleError> {
    let mut marks = vec![Mark::Unvisited; graph.table_count()];
    let mut order = Vec::with_capacity(graph.table_count());
    let mut stack: Vec<(TableId, usize)> = Vec::new();

    for (root, _) in graph.tables() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }
        marks[root.index()] = Mark::InProgress;
        stack.push((root, 0));

        while let Some(&(current, next_edge)) = stack.last() {
            let foreign_keys = &graph.table(current).foreign_keys;
            let Some(foreign_key) = foreign_keys.get(next_edge) else {
                marks[current.index()] = Mark::Finished;
                order.push(current);
                stack.pop();
                continue;
            };
            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }

            let target = foreign_key.target.table;
            match marks[target.index()] {
                Mark::Finished => {}
                Mark::Unvisited => {
                    marks[target.index()] = Mark::InProgress;
                    stack.push((target, 0));
                }
                Mark::InProgress => {
                    let start = stack
                        .iter()
                        .position(|(id, _)| *id == target)
                        .unwrap_or(0);
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|(id, _)| graph.table(*id).qualified_name())
                        .collect();
                    path.push(graph.table(target).qualified_name());
                    return Err(CycleError { path });
                }
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKey, ForeignKeyRef};
    use crate::types::{SqlType, TypeFamily};

    fn table(graph: &mut SchemaGraph, name: &str) -> TableId {
        let id = graph.create_table("public", name).unwrap();
        graph
            .table_mut(id)
            .add_column(Column::new("id", SqlType::new("int4", TypeFamily::Int)))
            .unwrap();
        id
    }

    fn reference(graph: &mut SchemaGraph, from: TableId, to: TableId) {
        let target = graph.table(to);
        let foreign_key = ForeignKey {
            columns: vec!["id".to_string()],
            target: ForeignKeyRef {
                table: to,
                schema: target.schema.clone(),
                table_name: target.name.clone(),
                columns: vec!["id".to_string()],
            },
        };
        graph.table_mut(from).add_foreign_key(foreign_key);
    }

    #[test]
    fn orders_dependencies_before_dependents() {
        let mut graph = SchemaGraph::new();
        let orders = table(&mut graph, "orders");
        let items = table(&mut graph, "items");
        let users = table(&mut graph, "users");
        let products = table(&mut graph, "products");
        reference(&mut graph, orders, users);
        reference(&mut graph, items, orders);
        reference(&mut graph, items, products);

        let order = resolve_fill_order(&graph).expect("expected order");
        assert_eq!(order.len(), 4);
        let position = |id: TableId| order.iter().position(|item| *item == id).unwrap();
        assert!(position(users) < position(orders));
        assert!(position(orders) < position(items));
        assert!(position(products) < position(items));

        let summary = summarize_fk_graph(&graph);
        assert_eq!(summary, FkGraphSummary { nodes: 4, edges: 3 });
    }

    #[test]
    fn shared_targets_are_visited_once() {
        let mut graph = SchemaGraph::new();
        let root = table(&mut graph, "root");
        let left = table(&mut graph, "left");
        let right = table(&mut graph, "right");
        let leaf = table(&mut graph, "leaf");
        reference(&mut graph, left, root);
        reference(&mut graph, right, root);
        reference(&mut graph, leaf, left);
        reference(&mut graph, leaf, right);

        let order = resolve_fill_order(&graph).unwrap();
        assert_eq!(order, vec![root, left, right, leaf]);
    }

    #[test]
    fn reports_mutual_reference_cycle() {
        let mut graph = SchemaGraph::new();
        let a = table(&mut graph, "a");
        let b = table(&mut graph, "b");
        reference(&mut graph, a, b);
        reference(&mut graph, b, a);

        let err = resolve_fill_order(&graph).unwrap_err();
        assert_eq!(err.path, vec!["public.a", "public.b", "public.a"]);
        assert_eq!(
            err.to_string(),
            "cycle detected in foreign key constraints: public.a -> public.b -> public.a"
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut graph = SchemaGraph::new();
        let t = table(&mut graph, "t");
        reference(&mut graph, t, t);

        let err = resolve_fill_order(&graph).unwrap_err();
        assert_eq!(err.path, vec!["public.t", "public.t"]);
    }

    #[test]
    fn cycle_path_starts_at_repeated_table() {
        let mut graph = SchemaGraph::new();
        let entry = table(&mut graph, "entry");
        let x = table(&mut graph, "x");
        let y = table(&mut graph, "y");
        reference(&mut graph, entry, x);
        reference(&mut graph, x, y);
        reference(&mut graph, y, x);

        let err = resolve_fill_order(&graph).unwrap_err();
        assert_eq!(err.path, vec!["public.x", "public.y", "public.x"]);
    }
}
