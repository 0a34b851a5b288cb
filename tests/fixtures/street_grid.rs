//! Hand-built street networks with known geometry.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use route_fitness::graph::{EdgeData, Graph, Node, NodeId};

fn node_at(row: i64, col: i64) -> Node {
    Node {
        lat: 51.5 + row as f64 * 0.001,
        lon: -0.15 + col as f64 * 0.001,
    }
}

pub fn edge(length: f64, highway: &str) -> EdgeData {
    EdgeData {
        length,
        highway: highway.to_string(),
    }
}

/// Three nodes in a line: 1 -- 2 -- 3, residential, 100m per hop.
pub fn line_graph() -> Graph {
    let mut g = Graph::new();
    for id in 1..=3 {
        g.add_node(id, node_at(0, id));
    }
    g.add_edge(1, 2, edge(100.0, "residential"));
    g.add_edge(2, 3, edge(100.0, "residential"));
    g
}

/// A 3x3 street grid plus one isolated node:
///
/// ```text
/// 1 - 2 - 3
/// |   |   |
/// 4 - 5 - 6        10
/// |   |   |
/// 7 - 8 - 9
/// ```
///
/// Horizontal edges are 100m residential, vertical edges are 100m
/// primary. Node 10 is disconnected.
pub fn grid_graph() -> Graph {
    let mut g = Graph::new();
    for row in 0..3 {
        for col in 0..3 {
            let id: NodeId = row * 3 + col + 1;
            g.add_node(id, node_at(row, col));
        }
    }
    for row in 0..3i64 {
        for col in 0..3i64 {
            let id = row * 3 + col + 1;
            if col < 2 {
                g.add_edge(id, id + 1, edge(100.0, "residential"));
            }
            if row < 2 {
                g.add_edge(id, id + 3, edge(100.0, "primary"));
            }
        }
    }
    g.add_node(10, node_at(1, 4));
    g
}
