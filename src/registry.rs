//! Route registry: named route candidates and their derived sub-graphs.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RouteError;
use crate::graph::{Graph, NodeId, PathWeight};

/// A registered route candidate.
///
/// Created only through [`RouteRegistry::register`]; immutable after
/// registration except for the fitness value the engine writes back.
/// The derived sub-graphs are snapshots, independent of the source
/// graph they were induced from.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    start_node: NodeId,
    end_node: NodeId,
    path: Vec<NodeId>,
    route_graph: Graph,
    route_and_neighbour_graph: Graph,
    fitness: Option<f64>,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    pub fn end_node(&self) -> NodeId {
        self.end_node
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Sub-graph induced by exactly the path nodes.
    pub fn route_graph(&self) -> &Graph {
        &self.route_graph
    }

    /// Sub-graph induced by the path nodes plus their one-hop
    /// neighbors.
    pub fn route_and_neighbour_graph(&self) -> &Graph {
        &self.route_and_neighbour_graph
    }

    /// Evaluated fitness: `None` until the engine has scored this
    /// route, `Some(f64::NEG_INFINITY)` for a rejected route. Once
    /// scored, a route never reverts to unscored.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }
}

/// Named route candidates over one borrowed source graph.
///
/// The registry owns every record; the source graph is read-only and
/// may be shared across registries. Not internally synchronized:
/// concurrent mutation requires external locking.
#[derive(Debug)]
pub struct RouteRegistry<'g> {
    graph: &'g Graph,
    routes: BTreeMap<String, Route>,
}

impl<'g> RouteRegistry<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            routes: BTreeMap::new(),
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Register a route under `name`, overwriting any previous record
    /// with the same name.
    ///
    /// Derives the two induced sub-graphs (path, and path plus one-hop
    /// neighbors) as snapshots. Does not validate that `path` is a
    /// walk; callers supplying a hand-built path own that guarantee,
    /// and evaluation surfaces the mismatch later.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        start_node: NodeId,
        end_node: NodeId,
        path: Vec<NodeId>,
    ) {
        let path_nodes: BTreeSet<NodeId> = path.iter().copied().collect();
        let mut extended = path_nodes.clone();
        for &node in &path_nodes {
            extended.extend(self.graph.neighbors(node));
        }

        let name = name.into();
        let route = Route {
            name: name.clone(),
            start_node,
            end_node,
            route_graph: self.graph.induced_subgraph(&path_nodes),
            route_and_neighbour_graph: self.graph.induced_subgraph(&extended),
            path,
            fitness: None,
        };
        self.routes.insert(name, route);
    }

    /// Compute the shortest path between the endpoints and register it.
    ///
    /// Fails with `NoPath` when the endpoints are disconnected; nothing
    /// is registered in that case.
    pub fn register_shortest(
        &mut self,
        name: impl Into<String>,
        start_node: NodeId,
        end_node: NodeId,
        weight: PathWeight,
    ) -> Result<(), RouteError> {
        let path = self.graph.shortest_path(start_node, end_node, weight)?;
        self.register(name, start_node, end_node, path);
        Ok(())
    }

    /// Look up a route by name. Missing names are not an error.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Routes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.routes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
