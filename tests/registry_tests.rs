//! Route registry tests
//!
//! Registration round-trips, derived sub-graph contents, shortest-path
//! registration, and lookup behavior.

mod fixtures;

use std::collections::BTreeSet;

use route_fitness::error::RouteError;
use route_fitness::graph::{NodeId, PathWeight};
use route_fitness::registry::RouteRegistry;

use fixtures::{edge, grid_graph, line_graph};

fn node_set(ids: impl IntoIterator<Item = NodeId>) -> BTreeSet<NodeId> {
    ids.into_iter().collect()
}

#[test]
fn register_then_get_round_trips() {
    let graph = grid_graph();
    let mut registry = RouteRegistry::new(&graph);

    registry.register("top_row", 1, 3, vec![1, 2, 3]);

    let route = registry.get("top_row").expect("route should exist");
    assert_eq!(route.name(), "top_row");
    assert_eq!(route.start_node(), 1);
    assert_eq!(route.end_node(), 3);
    assert_eq!(route.path(), &[1, 2, 3]);
    assert_eq!(route.fitness(), None);
}

#[test]
fn route_graph_contains_exactly_the_path_nodes() {
    let graph = grid_graph();
    let mut registry = RouteRegistry::new(&graph);
    registry.register("top_row", 1, 3, vec![1, 2, 3]);

    let route = registry.get("top_row").unwrap();
    let nodes: BTreeSet<NodeId> = route.route_graph().node_ids().collect();
    assert_eq!(nodes, node_set([1, 2, 3]));

    // Edges between path nodes survive; edges to outside nodes do not.
    assert_eq!(route.route_graph().edges_between(1, 2).len(), 1);
    assert!(route.route_graph().edges_between(1, 4).is_empty());
}

#[test]
fn neighbour_graph_is_path_plus_one_hop_neighbors() {
    let graph = grid_graph();
    let mut registry = RouteRegistry::new(&graph);
    registry.register("top_row", 1, 3, vec![1, 2, 3]);

    let route = registry.get("top_row").unwrap();
    let nodes: BTreeSet<NodeId> = route.route_and_neighbour_graph().node_ids().collect();
    // Path {1,2,3} plus neighbors {4,5,6}; sets deduplicate shared
    // neighbors by construction.
    assert_eq!(nodes, node_set([1, 2, 3, 4, 5, 6]));
}

#[test]
fn derived_graphs_are_snapshots_of_the_source() {
    let mut graph = grid_graph();
    let route = {
        let mut registry = RouteRegistry::new(&graph);
        registry.register("top_row", 1, 3, vec![1, 2, 3]);
        registry.get("top_row").unwrap().clone()
    };

    // Mutating the source after registration must not leak into the
    // derived graphs.
    graph.add_edge(1, 2, edge(10.0, "footway"));
    assert_eq!(route.route_graph().edges_between(1, 2).len(), 1);
}

#[test]
fn register_overwrites_same_name() {
    let graph = grid_graph();
    let mut registry = RouteRegistry::new(&graph);

    registry.register("loop", 1, 3, vec![1, 2, 3]);
    registry.register("loop", 1, 9, vec![1, 4, 5, 6, 9]);

    assert_eq!(registry.len(), 1);
    let route = registry.get("loop").unwrap();
    assert_eq!(route.path(), &[1, 4, 5, 6, 9]);
    assert_eq!(route.end_node(), 9);
    assert_eq!(route.fitness(), None);
}

#[test]
fn get_missing_name_is_none_not_an_error() {
    let graph = line_graph();
    let registry = RouteRegistry::new(&graph);
    assert!(registry.get("nope").is_none());
}

#[test]
fn register_shortest_on_line_graph() {
    let graph = line_graph();
    let mut registry = RouteRegistry::new(&graph);

    registry
        .register_shortest("direct", 1, 3, PathWeight::Length)
        .unwrap();

    let route = registry.get("direct").unwrap();
    assert_eq!(route.path(), &[1, 2, 3]);
    assert_eq!(route.start_node(), 1);
    assert_eq!(route.end_node(), 3);
}

#[test]
fn register_shortest_surfaces_no_path() {
    let graph = grid_graph();
    let mut registry = RouteRegistry::new(&graph);

    let err = registry
        .register_shortest("stranded", 1, 10, PathWeight::Hops)
        .unwrap_err();
    assert!(matches!(err, RouteError::NoPath { start: 1, end: 10 }));
    assert!(registry.get("stranded").is_none());
}

#[test]
fn registry_iterates_in_name_order() {
    let graph = grid_graph();
    let mut registry = RouteRegistry::new(&graph);
    registry.register("b", 1, 2, vec![1, 2]);
    registry.register("a", 2, 3, vec![2, 3]);

    let names: Vec<&str> = registry.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["a", "b"]);
}
