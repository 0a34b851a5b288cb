//! Fitness engine: weighted multi-criteria evaluation of registered
//! routes.
//!
//! The engine is configured once (weights, distance target, road-type
//! table, hard-fail set) and then run over a registry. Criteria that
//! are named but not yet implemented are excluded from the sum
//! explicitly, never silently counted as a zero measurement.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::RouteError;
use crate::registry::{Route, RouteRegistry};
use crate::score::{
    length_by_highway, score_distance, score_road_type, total_length, RoadTypeWeights,
    VariancePolicy,
};

/// The closed set of known scoring criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Criterion {
    /// Deviation of the measured route length from the desired length.
    Distance,
    /// Desirability of the highway categories making up the route.
    RoadType,
    /// Terrain steepness along the route. Named extension point, not
    /// yet implemented.
    Incline,
}

impl Criterion {
    fn name(self) -> &'static str {
        match self {
            Criterion::Distance => "distance",
            Criterion::RoadType => "road_type",
            Criterion::Incline => "incline",
        }
    }
}

/// Desired distance band for the distance criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceTarget {
    /// Desired route length, meters.
    pub desired_m: f64,
    /// Allowed deviation before the variance policy applies, meters.
    pub max_variance_m: f64,
    /// What to do when the deviation exceeds the allowed variance.
    pub policy: VariancePolicy,
}

impl DistanceTarget {
    pub fn new(desired_m: f64, max_variance_m: f64) -> Self {
        Self {
            desired_m,
            max_variance_m,
            policy: VariancePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: VariancePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Engine configuration, passed in at construction.
#[derive(Debug, Clone)]
pub struct FitnessConfig {
    /// Per-criterion weights; criteria without an entry weigh 1.
    pub weights: BTreeMap<Criterion, f64>,
    pub distance: DistanceTarget,
    pub road_type: RoadTypeWeights,
    /// Criteria whose negative-infinity score rejects the whole route.
    pub hard_fail: BTreeSet<Criterion>,
}

impl FitnessConfig {
    pub fn new(distance: DistanceTarget) -> Self {
        Self {
            weights: BTreeMap::new(),
            distance,
            road_type: RoadTypeWeights::default(),
            hard_fail: BTreeSet::from([Criterion::Distance]),
        }
    }

    pub fn with_weight(mut self, criterion: Criterion, weight: f64) -> Self {
        self.weights.insert(criterion, weight);
        self
    }

    pub fn with_road_type_weights(mut self, road_type: RoadTypeWeights) -> Self {
        self.road_type = road_type;
        self
    }

    fn weight(&self, criterion: Criterion) -> f64 {
        self.weights.get(&criterion).copied().unwrap_or(1.0)
    }
}

/// The set of criteria the engine runs.
#[derive(Debug, Clone, Default)]
pub struct ScoringPolicy {
    criteria: BTreeSet<Criterion>,
}

impl ScoringPolicy {
    /// Distance plus road type, the implemented criteria.
    pub fn standard() -> Self {
        Self {
            criteria: BTreeSet::from([Criterion::Distance, Criterion::RoadType]),
        }
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criteria.insert(criterion);
        self
    }

    pub fn criteria(&self) -> impl Iterator<Item = Criterion> + '_ {
        self.criteria.iter().copied()
    }
}

/// Result of scoring one route against one criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CriterionOutcome {
    /// A finite computed score.
    Score(f64),
    /// Negative infinity from a hard-fail criterion.
    HardFail,
    /// The criterion is a declared extension point with no calculator;
    /// it contributes nothing to the sum.
    NotImplemented,
}

/// Per-route evaluation breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFitness {
    pub total: f64,
    pub outcomes: BTreeMap<Criterion, CriterionOutcome>,
}

/// Outcome of one `evaluate_all` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// No scoring policy registered; nothing was scored.
    NotConfigured,
    Evaluated { routes_scored: usize },
}

/// Computes and attaches fitness values to registered routes.
#[derive(Debug, Clone)]
pub struct FitnessEngine {
    config: FitnessConfig,
    policy: Option<ScoringPolicy>,
}

impl FitnessEngine {
    pub fn new(config: FitnessConfig) -> Result<Self, RouteError> {
        for (&criterion, &weight) in &config.weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RouteError::InvalidArgument(format!(
                    "weight for {} must be finite and non-negative, got {weight}",
                    criterion.name()
                )));
            }
        }
        Ok(Self {
            config,
            policy: None,
        })
    }

    /// Register the scoring policy. Without one, `evaluate_all` is a
    /// no-op that reports [`Evaluation::NotConfigured`].
    pub fn register_policy(&mut self, policy: ScoringPolicy) {
        self.policy = Some(policy);
    }

    /// Score every registered route and write the fitness back onto
    /// its record.
    ///
    /// Deterministic for identical inputs, and idempotent: a second
    /// pass over an unchanged registry produces identical values.
    /// Measurement failures (a registered path that is not a walk)
    /// surface as errors rather than becoming a default score.
    pub fn evaluate_all(&self, registry: &mut RouteRegistry<'_>) -> Result<Evaluation, RouteError> {
        let Some(policy) = &self.policy else {
            warn!("no scoring policy registered, routes left unscored");
            return Ok(Evaluation::NotConfigured);
        };

        let mut routes_scored = 0;
        for route in registry.iter_mut() {
            let fitness = self.evaluate_route(route, policy)?;
            debug!(route = route.name(), total = fitness.total, "route scored");
            route.set_fitness(fitness.total);
            routes_scored += 1;
        }
        Ok(Evaluation::Evaluated { routes_scored })
    }

    /// Evaluate a single route without mutating it.
    pub fn evaluate_route(
        &self,
        route: &Route,
        policy: &ScoringPolicy,
    ) -> Result<RouteFitness, RouteError> {
        let lengths = length_by_highway(route.route_graph(), route.path())?;
        let actual_m = total_length(&lengths);

        let mut total = 0.0;
        let mut outcomes = BTreeMap::new();
        for criterion in policy.criteria() {
            let outcome = match criterion {
                Criterion::Distance => {
                    let target = self.config.distance;
                    let score =
                        score_distance(target.desired_m, actual_m, target.max_variance_m, target.policy)?;
                    if score == f64::NEG_INFINITY {
                        CriterionOutcome::HardFail
                    } else {
                        CriterionOutcome::Score(score)
                    }
                }
                Criterion::RoadType => {
                    let result = score_road_type(&lengths, &self.config.road_type);
                    if result.prohibited_length > 0.0 {
                        debug!(
                            route = route.name(),
                            prohibited_m = result.prohibited_length,
                            "route uses prohibited road types"
                        );
                    }
                    CriterionOutcome::Score(result.score)
                }
                Criterion::Incline => {
                    debug!(
                        criterion = criterion.name(),
                        "criterion not implemented, excluded from evaluation"
                    );
                    CriterionOutcome::NotImplemented
                }
            };

            outcomes.insert(criterion, outcome);
            match outcome {
                CriterionOutcome::HardFail if self.config.hard_fail.contains(&criterion) => {
                    // One hard failure rejects the route outright.
                    return Ok(RouteFitness {
                        total: f64::NEG_INFINITY,
                        outcomes,
                    });
                }
                CriterionOutcome::HardFail => {
                    total = f64::NEG_INFINITY;
                }
                CriterionOutcome::Score(score) => {
                    let weight = self.config.weight(criterion);
                    // A zero weight excludes the criterion; skipping
                    // avoids 0 * -inf on pathological scores.
                    if weight > 0.0 {
                        total += weight * score;
                    }
                }
                CriterionOutcome::NotImplemented => {}
            }
        }

        Ok(RouteFitness { total, outcomes })
    }
}
