//! Graph acquisition: Overpass HTTP client plus file cache.
//!
//! The core only consumes an already-built [`Graph`]; this module is
//! the collaborator that produces one for a location, radius, and
//! network type, with cache-or-generate semantics. Failures surface as
//! `GraphUnavailable`; retry policy, if any, belongs to the caller.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{GraphUnavailableReason, RouteError};
use crate::graph::{EdgeData, Graph, Node, NodeId};
use crate::haversine::haversine_m;

/// Minimum query radius in meters.
pub const MIN_RADIUS_M: f64 = 1.0;

/// Maximum query radius in meters. Larger areas produce very large
/// downloads and may get the client rate-limited by the data provider.
pub const MAX_RADIUS_M: f64 = 7_000.0;

/// Tag filter for an Overpass way query, by network type.
///
/// Unknown types are an error, never a silent fallback to a broader
/// filter.
pub fn network_filter(network_type: &str) -> Result<&'static str, RouteError> {
    match network_type {
        "skate" => Ok(concat!(
            "[\"highway\"][\"area\"!~\"yes\"]",
            "[\"highway\"!~\"abandoned|bridleway|bus_guideway|construction|corridor|",
            "elevator|escalator|no|path|planned|platform|proposed|raceway|razed|",
            "service|steps|track\"]",
            "[\"bicycle\"!~\"no\"]",
            "[\"service\"!~\"alley|driveway|emergency_access|parking|parking_aisle|private\"]",
            "[\"surface\"!~\"sand|cobblestone|dirt\"]",
        )),
        "walk" => Ok(concat!(
            "[\"highway\"][\"area\"!~\"yes\"]",
            "[\"highway\"!~\"abandoned|bus_guideway|construction|motor|planned|platform|",
            "proposed|raceway\"]",
            "[\"foot\"!~\"no\"]",
        )),
        "bike" => Ok(concat!(
            "[\"highway\"][\"area\"!~\"yes\"]",
            "[\"highway\"!~\"abandoned|bus_guideway|construction|corridor|elevator|",
            "escalator|footway|motor|planned|platform|proposed|raceway|steps\"]",
            "[\"bicycle\"!~\"no\"]",
        )),
        "drive" => Ok(concat!(
            "[\"highway\"][\"area\"!~\"yes\"]",
            "[\"highway\"!~\"abandoned|bridleway|construction|corridor|cycleway|elevator|",
            "escalator|footway|path|pedestrian|planned|platform|proposed|raceway|steps|track\"]",
            "[\"motor_vehicle\"!~\"no\"][\"motorcar\"!~\"no\"]",
        )),
        other => Err(RouteError::UnknownNetworkType(other.to_string())),
    }
}

/// A validated graph request: center point, radius, network type.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQuery {
    lat: f64,
    lon: f64,
    radius_m: f64,
    network_type: String,
}

impl GraphQuery {
    pub fn new(
        lat: f64,
        lon: f64,
        radius_m: f64,
        network_type: impl Into<String>,
    ) -> Result<Self, RouteError> {
        if !lat.is_finite() || lat.abs() > 90.0 {
            return Err(RouteError::InvalidArgument(format!(
                "latitude must be within [-90, 90], got {lat}"
            )));
        }
        if !lon.is_finite() || lon.abs() > 180.0 {
            return Err(RouteError::InvalidArgument(format!(
                "longitude must be within [-180, 180], got {lon}"
            )));
        }
        if !radius_m.is_finite() || !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius_m) {
            return Err(RouteError::InvalidArgument(format!(
                "radius must be within [{MIN_RADIUS_M}, {MAX_RADIUS_M}] meters, got {radius_m}"
            )));
        }
        let network_type = network_type.into();
        network_filter(&network_type)?;
        Ok(Self {
            lat,
            lon,
            radius_m,
            network_type,
        })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn network_type(&self) -> &str {
        &self.network_type
    }

    /// Cache filename for this query.
    pub fn cache_key(&self) -> String {
        format!(
            "graph_{:.7}_{:.7}_{:.0}_{}.json",
            self.lat, self.lon, self.radius_m, self.network_type
        )
    }
}

/// Supplies a graph for a query. May perform network or filesystem IO.
pub trait GraphProvider {
    fn graph_for(&self, query: &GraphQuery) -> Result<Graph, RouteError>;
}

#[derive(Debug, Clone)]
pub struct OverpassConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: "https://overpass-api.de/api/interpreter".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Overpass API client producing road-network graphs.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    config: OverpassConfig,
    client: reqwest::blocking::Client,
}

impl OverpassClient {
    pub fn new(config: OverpassConfig) -> Result<Self, RouteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn build_query(&self, query: &GraphQuery) -> Result<String, RouteError> {
        let filter = network_filter(query.network_type())?;
        Ok(format!(
            "[out:json];way(around:{:.0},{:.7},{:.7}){};(._;>;);out body;",
            query.radius_m(),
            query.lat(),
            query.lon(),
            filter
        ))
    }
}

impl GraphProvider for OverpassClient {
    fn graph_for(&self, query: &GraphQuery) -> Result<Graph, RouteError> {
        let overpass_query = self.build_query(query)?;
        debug!(url = %self.config.base_url, "requesting graph from Overpass");
        let body = self
            .client
            .post(&self.config.base_url)
            .form(&[("data", overpass_query.as_str())])
            .send()?
            .error_for_status()?
            .text()?;
        parse_overpass_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: NodeId,
        lat: f64,
        lon: f64,
    },
    Way {
        nodes: Vec<NodeId>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
}

/// Build a [`Graph`] from an Overpass JSON payload.
///
/// Ways without a `highway` tag, and way segments referencing nodes
/// missing from the payload, are skipped. Edge lengths come from the
/// haversine distance between the segment's node coordinates.
pub fn parse_overpass_json(body: &str) -> Result<Graph, RouteError> {
    let response: OverpassResponse = serde_json::from_str(body)
        .map_err(|err| RouteError::GraphUnavailable(GraphUnavailableReason::Malformed(err.to_string())))?;

    let mut graph = Graph::new();
    for element in &response.elements {
        if let OverpassElement::Node { id, lat, lon } = element {
            graph.add_node(
                *id,
                Node {
                    lat: *lat,
                    lon: *lon,
                },
            );
        }
    }

    for element in &response.elements {
        let OverpassElement::Way { nodes, tags } = element else {
            continue;
        };
        let Some(highway) = tags.get("highway") else {
            continue;
        };
        for pair in nodes.windows(2) {
            let (Some(a), Some(b)) = (graph.node(pair[0]), graph.node(pair[1])) else {
                continue;
            };
            let length = haversine_m((a.lat, a.lon), (b.lat, b.lon));
            graph.add_edge(
                pair[0],
                pair[1],
                EdgeData {
                    length,
                    highway: highway.clone(),
                },
            );
        }
    }

    Ok(graph)
}

/// Directory of cached graphs, one JSON file per query.
#[derive(Debug, Clone)]
pub struct GraphCache {
    dir: PathBuf,
}

impl GraphCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the cached graph for `query`, if one exists.
    pub fn load(&self, query: &GraphQuery) -> Result<Option<Graph>, RouteError> {
        let path = self.dir.join(query.cache_key());
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&path)?);
        let graph = serde_json::from_reader(reader).map_err(|err| {
            RouteError::GraphUnavailable(GraphUnavailableReason::Malformed(format!(
                "cache file {}: {err}",
                path.display()
            )))
        })?;
        debug!(path = %path.display(), "graph cache hit");
        Ok(Some(graph))
    }

    /// Save `graph` under the query's cache key. Writes to a temporary
    /// file first so a crash cannot leave a truncated cache entry.
    pub fn save(&self, query: &GraphQuery, graph: &Graph) -> Result<(), RouteError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(query.cache_key());
        let tmp_path = path.with_extension("tmp");
        let writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(writer, graph).map_err(|err| {
            RouteError::GraphUnavailable(GraphUnavailableReason::Malformed(err.to_string()))
        })?;
        fs::rename(tmp_path, &path)?;
        debug!(path = %path.display(), "graph cached");
        Ok(())
    }
}

/// Cache-or-generate wrapper around another provider.
#[derive(Debug, Clone)]
pub struct CachedProvider<P> {
    cache: GraphCache,
    inner: P,
}

impl<P: GraphProvider> CachedProvider<P> {
    pub fn new(cache: GraphCache, inner: P) -> Self {
        Self { cache, inner }
    }
}

impl<P: GraphProvider> GraphProvider for CachedProvider<P> {
    fn graph_for(&self, query: &GraphQuery) -> Result<Graph, RouteError> {
        if let Some(graph) = self.cache.load(query)? {
            return Ok(graph);
        }
        info!(
            network_type = query.network_type(),
            radius_m = query.radius_m(),
            "graph cache miss, generating"
        );
        let graph = self.inner.graph_for(query)?;
        self.cache.save(query, &graph)?;
        Ok(graph)
    }
}
