//! Road-network graph model and geometry primitives.
//!
//! An undirected multigraph over OSM-style node ids. Adjacency is kept
//! in `BTreeMap`s so traversal order, and therefore shortest-path
//! tie-breaking, is deterministic across runs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// OSM-style opaque node identifier.
pub type NodeId = i64;

/// A graph node with its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub lat: f64,
    pub lon: f64,
}

/// Attributes of one road segment between two nodes.
///
/// Parallel edges between the same node pair may exist; where a single
/// edge must be attributed to a hop, the shortest parallel edge wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Segment length in meters, positive.
    pub length: f64,
    /// Highway classification tag, e.g. "residential".
    pub highway: String,
}

/// Edge weighting for shortest-path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathWeight {
    /// Minimize hop count (breadth-first).
    Hops,
    /// Minimize total edge length (Dijkstra).
    Length,
}

/// Undirected multigraph of road segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, Vec<EdgeData>>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, node: Node) {
        self.nodes.insert(id, node);
        self.adjacency.entry(id).or_default();
    }

    /// Add an undirected edge. Parallel edges accumulate.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, edge: EdgeData) {
        self.adjacency
            .entry(a)
            .or_default()
            .entry(b)
            .or_default()
            .push(edge.clone());
        self.adjacency
            .entry(b)
            .or_default()
            .entry(a)
            .or_default()
            .push(edge);
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// One-hop neighbors of `id`, in ascending order. Empty for an
    /// unknown node.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|nbrs| nbrs.keys().copied())
    }

    /// All parallel edges between `a` and `b`.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> &[EdgeData] {
        self.adjacency
            .get(&a)
            .and_then(|nbrs| nbrs.get(&b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The shortest parallel edge between `a` and `b`, if any.
    pub fn best_edge(&self, a: NodeId, b: NodeId) -> Option<&EdgeData> {
        self.edges_between(a, b)
            .iter()
            .min_by(|x, y| x.length.partial_cmp(&y.length).unwrap_or(Ordering::Equal))
    }

    /// Whether `path` is a valid walk: every node exists and every
    /// consecutive pair is adjacent.
    pub fn is_walk(&self, path: &[NodeId]) -> bool {
        match path {
            [] => false,
            [only] => self.contains_node(*only),
            _ => {
                path.iter().all(|id| self.contains_node(*id))
                    && path
                        .windows(2)
                        .all(|pair| !self.edges_between(pair[0], pair[1]).is_empty())
            }
        }
    }

    /// Snapshot of the sub-graph induced by `node_ids`: exactly those
    /// nodes and the edges between them. An independent copy, safe to
    /// keep after the source graph is regenerated.
    pub fn induced_subgraph(&self, node_ids: &BTreeSet<NodeId>) -> Graph {
        let mut sub = Graph::new();
        for &id in node_ids {
            if let Some(node) = self.nodes.get(&id) {
                sub.add_node(id, *node);
            }
        }
        for &a in node_ids {
            if let Some(nbrs) = self.adjacency.get(&a) {
                for (&b, edges) in nbrs {
                    // Undirected: insert each pair once.
                    if a < b && node_ids.contains(&b) {
                        for edge in edges {
                            sub.add_edge(a, b, edge.clone());
                        }
                    }
                }
            }
        }
        sub
    }

    /// Shortest path from `start` to `end` under the given weighting.
    pub fn shortest_path(
        &self,
        start: NodeId,
        end: NodeId,
        weight: PathWeight,
    ) -> Result<Vec<NodeId>, RouteError> {
        if !self.contains_node(start) || !self.contains_node(end) {
            return Err(RouteError::NoPath { start, end });
        }
        if start == end {
            return Ok(vec![start]);
        }
        let predecessors = match weight {
            PathWeight::Hops => self.bfs_predecessors(start, end),
            PathWeight::Length => self.dijkstra_predecessors(start, end),
        };
        reconstruct(&predecessors, start, end).ok_or(RouteError::NoPath { start, end })
    }

    fn bfs_predecessors(&self, start: NodeId, end: NodeId) -> BTreeMap<NodeId, NodeId> {
        let mut predecessors = BTreeMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(current) {
                if neighbor != start && !predecessors.contains_key(&neighbor) {
                    predecessors.insert(neighbor, current);
                    if neighbor == end {
                        return predecessors;
                    }
                    queue.push_back(neighbor);
                }
            }
        }
        predecessors
    }

    fn dijkstra_predecessors(&self, start: NodeId, end: NodeId) -> BTreeMap<NodeId, NodeId> {
        let mut predecessors = BTreeMap::new();
        let mut distances: BTreeMap<NodeId, f64> = BTreeMap::from([(start, 0.0)]);
        let mut heap = BinaryHeap::from([QueueEntry {
            cost: 0.0,
            node: start,
        }]);

        while let Some(QueueEntry { cost, node }) = heap.pop() {
            if node == end {
                break;
            }
            if distances.get(&node).is_some_and(|&best| cost > best) {
                continue;
            }
            for neighbor in self.neighbors(node) {
                let Some(edge) = self.best_edge(node, neighbor) else {
                    continue;
                };
                let next_cost = cost + edge.length;
                if distances
                    .get(&neighbor)
                    .is_none_or(|&best| next_cost < best)
                {
                    distances.insert(neighbor, next_cost);
                    predecessors.insert(neighbor, node);
                    heap.push(QueueEntry {
                        cost: next_cost,
                        node: neighbor,
                    });
                }
            }
        }
        predecessors
    }
}

/// Min-heap entry ordered by cost, then node id for determinism.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the cheapest first.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn reconstruct(
    predecessors: &BTreeMap<NodeId, NodeId>,
    start: NodeId,
    end: NodeId,
) -> Option<Vec<NodeId>> {
    if !predecessors.contains_key(&end) {
        return None;
    }
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        current = *predecessors.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}
