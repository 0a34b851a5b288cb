//! Fitness score calculators.
//!
//! Pure functions over measured route attributes. Each returns a score
//! in roughly [0, 1], or negative infinity when a hard-fail policy
//! rejects the route outright. Invalid numeric inputs are surfaced as
//! errors, never coerced to a default score.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::RouteError;
use crate::graph::{Graph, NodeId};

/// Multiplier applied to the road-type score when any length falls
/// under a prohibited category.
const PROHIBITED_PENALTY: f64 = 0.1;

/// Default multiplier applied to the distance score when the deviation
/// exceeds the allowed variance under the soft-penalty policy.
pub const DEFAULT_VARIANCE_PENALTY: f64 = 0.05;

/// What happens when a route's distance deviates beyond `max_variance`.
///
/// Two historical behaviors exist for this case: rejecting the route
/// outright, or keeping it with a heavy penalty so the caller can still
/// rank near-misses. Both remain available; soft penalty is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariancePolicy {
    /// Multiply the base score by the given factor, in (0, 1).
    SoftPenalty(f64),
    /// Return negative infinity, rejecting the route.
    HardFail,
}

impl Default for VariancePolicy {
    fn default() -> Self {
        VariancePolicy::SoftPenalty(DEFAULT_VARIANCE_PENALTY)
    }
}

/// Score how close `actual` distance is to `desired`.
///
/// The base score is `1 - deviation / (max_variance + deviation)`:
/// exactly 1.0 at zero deviation, symmetric in the sign of the
/// deviation, monotonically decreasing toward 0 as the deviation grows.
/// Beyond `max_variance` the configured [`VariancePolicy`] applies.
pub fn score_distance(
    desired: f64,
    actual: f64,
    max_variance: f64,
    policy: VariancePolicy,
) -> Result<f64, RouteError> {
    if !desired.is_finite() || desired <= 0.0 {
        return Err(RouteError::InvalidArgument(format!(
            "desired distance must be finite and positive, got {desired}"
        )));
    }
    if !actual.is_finite() || actual <= 0.0 {
        return Err(RouteError::InvalidArgument(format!(
            "actual distance must be finite and positive, got {actual}"
        )));
    }
    if !max_variance.is_finite() || max_variance <= 0.0 || max_variance >= desired {
        return Err(RouteError::InvalidArgument(format!(
            "max_variance must satisfy 0 < max_variance < desired, got {max_variance}"
        )));
    }
    if let VariancePolicy::SoftPenalty(factor) = policy {
        if !factor.is_finite() || factor <= 0.0 || factor >= 1.0 {
            return Err(RouteError::InvalidArgument(format!(
                "variance penalty factor must be in (0, 1), got {factor}"
            )));
        }
    }

    let deviation = (desired - actual).abs();
    let base = 1.0 - deviation / (max_variance + deviation);

    let score = if deviation > max_variance {
        match policy {
            VariancePolicy::SoftPenalty(factor) => base * factor,
            VariancePolicy::HardFail => f64::NEG_INFINITY,
        }
    } else {
        base
    };

    debug!(
        desired,
        actual, deviation, max_variance, score, "distance score"
    );
    Ok(score)
}

/// Ordinal desirability of a highway category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Desirability {
    Prohibited,
    Avoid,
    Neutral,
    Prefer,
    Optimal,
}

impl Desirability {
    fn value(self) -> f64 {
        match self {
            Desirability::Prohibited => 0.0,
            Desirability::Avoid => 1.0,
            Desirability::Neutral => 2.0,
            Desirability::Prefer => 3.0,
            Desirability::Optimal => 4.0,
        }
    }
}

/// Per-category desirability table for road-type scoring.
///
/// Explicit configuration passed into the engine; categories absent
/// from the table are treated as unknown and ignored with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadTypeWeights {
    weights: BTreeMap<String, Desirability>,
}

impl Default for RoadTypeWeights {
    /// Table tuned for small-wheel street routes: quiet paved streets
    /// first, busy or rough surfaces discouraged, motorways forbidden.
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("residential".to_string(), Desirability::Optimal);
        weights.insert("primary".to_string(), Desirability::Prefer);
        weights.insert("secondary".to_string(), Desirability::Prefer);
        weights.insert("tertiary".to_string(), Desirability::Neutral);
        weights.insert("trunk".to_string(), Desirability::Neutral);
        weights.insert("cycleway".to_string(), Desirability::Avoid);
        weights.insert("pedestrian".to_string(), Desirability::Avoid);
        weights.insert("footway".to_string(), Desirability::Avoid);
        weights.insert("motorway".to_string(), Desirability::Prohibited);
        Self { weights }
    }
}

impl RoadTypeWeights {
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, highway: impl Into<String>, desirability: Desirability) -> &mut Self {
        self.weights.insert(highway.into(), desirability);
        self
    }

    pub fn get(&self, highway: &str) -> Option<Desirability> {
        self.weights.get(highway).copied()
    }

    /// Highest desirability value in the table, the normalization
    /// ceiling for [`score_road_type`].
    fn max_weight(&self) -> f64 {
        self.weights
            .values()
            .map(|d| d.value())
            .fold(0.0, f64::max)
    }
}

/// Road-type score plus diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadTypeScore {
    /// Normalized score in approximately [0, 1].
    pub score: f64,
    /// Total length that fell under prohibited categories, meters.
    pub prohibited_length: f64,
}

/// Score the road-type composition of a route.
///
/// `length_by_type` is meters of route length per highway category, as
/// produced by [`length_by_highway`]. Unknown categories are ignored.
/// Any prohibited length applies a strong multiplicative penalty and is
/// reported in the result. An empty composition scores 0.
pub fn score_road_type(
    length_by_type: &BTreeMap<String, f64>,
    weights: &RoadTypeWeights,
) -> RoadTypeScore {
    let mut raw = 0.0;
    let mut total_length = 0.0;
    let mut prohibited_length = 0.0;

    for (highway, &length) in length_by_type {
        match weights.get(highway) {
            None => {
                warn!(highway = %highway, length, "unknown highway category, ignoring");
            }
            Some(Desirability::Prohibited) => {
                prohibited_length += length;
                total_length += length;
            }
            Some(desirability) => {
                raw += desirability.value() * length;
                total_length += length;
            }
        }
    }

    if prohibited_length > 0.0 {
        raw *= PROHIBITED_PENALTY;
    }

    let max_weight = weights.max_weight();
    let score = if total_length > 0.0 && max_weight > 0.0 {
        raw / (total_length * max_weight)
    } else {
        0.0
    };

    RoadTypeScore {
        score,
        prohibited_length,
    }
}

/// Sum edge length along `path`, grouped by highway category.
///
/// For parallel edges between the same node pair, only the shortest
/// edge's category and length count. Fails if `path` is not a valid
/// walk in `graph`.
pub fn length_by_highway(
    graph: &Graph,
    path: &[NodeId],
) -> Result<BTreeMap<String, f64>, RouteError> {
    if !graph.is_walk(path) {
        return Err(RouteError::InvalidWalk);
    }
    let mut lengths: BTreeMap<String, f64> = BTreeMap::new();
    for pair in path.windows(2) {
        // is_walk guarantees at least one edge per hop.
        if let Some(edge) = graph.best_edge(pair[0], pair[1]) {
            *lengths.entry(edge.highway.clone()).or_insert(0.0) += edge.length;
        }
    }
    Ok(lengths)
}

/// Total route length in meters from a per-category breakdown.
pub fn total_length(length_by_type: &BTreeMap<String, f64>) -> f64 {
    length_by_type.values().sum()
}
